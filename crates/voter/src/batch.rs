// Copyright 2026 UMA Rocks, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Builds one wallet's transaction payload for a round: decides per
//! request whether anything is left to do, derives salts and commit
//! hashes for the included items, and folds multiple payloads into a
//! single `multicall`.

use alloy::{
    primitives::{Address, Bytes, B256},
    providers::Provider,
    signers::Signer,
    sol_types::SolCall,
};
use async_trait::async_trait;
use thiserror::Error;
use uma_voting::{
    contracts::IVotingV2,
    salt::{commit_hash, derive_salt, SaltError},
};

use crate::{
    chain::VotingChain,
    errors::CodedError,
    formatter::FormattedRequest,
    history::{prior_work_by_us, search_for_vote, should_skip_wallet, ActionOutcome, VoteRecord},
    impl_coded_debug,
};

#[derive(Error)]
pub enum BatchError {
    #[error("Salt derivation failed: {0}")]
    Salt(#[from] SaltError),
}

impl_coded_debug!(BatchError);

impl CodedError for BatchError {
    fn code(&self) -> &str {
        match self {
            BatchError::Salt(_) => "[V-BAT-5001]",
        }
    }
}

/// Dry-run seam, so batch building can be tested without a node.
#[async_trait]
pub trait CallSimulator: Send + Sync {
    /// Returns false when the dry run rejects the payload.
    async fn simulate(&self, from: Address, calldata: Bytes) -> bool;
}

#[async_trait]
impl<P: Provider + Clone + 'static> CallSimulator for VotingChain<P> {
    async fn simulate(&self, from: Address, calldata: Bytes) -> bool {
        match VotingChain::simulate(self, from, calldata).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Simulation rejected payload: {err:?}");
                false
            }
        }
    }
}

/// What one wallet should do this round.
#[derive(Debug)]
pub enum WalletPlan {
    /// Every request is already settled on chain; send nothing.
    NoAction { prior_by_us: bool, transaction_hash: Option<B256> },
    /// Exactly one transaction covering `items` requests.
    Submit { calldata: Bytes, items: usize },
    /// Requests needed action but no payload survived; the wallet has
    /// missed work it cannot recover this run.
    Unbuildable,
}

/// Builds the commit payload for one wallet.
///
/// Requests that already have a commit for the delegator are skipped
/// unless the answer is flagged `force`. Each included request is
/// simulated individually; a rejected item is dropped while the rest of
/// the batch proceeds.
pub async fn build_commit_batch(
    signer: &(impl Signer + Sync),
    delegator: Address,
    requests: &[FormattedRequest],
    commit_records: &[VoteRecord],
    simulator: &dyn CallSimulator,
) -> Result<WalletPlan, BatchError> {
    let delegate = signer.address();
    let mut outcomes = Vec::new();
    let mut calls = Vec::new();

    for request in requests {
        let outcome = search_for_vote(delegator, delegate, request, commit_records);
        if outcome.found && !request.force {
            tracing::info!(
                "Commit already on chain for {} request at time {} (delegate {delegate})",
                request.kind,
                request.time,
            );
            outcomes.push(outcome);
            continue;
        }

        let salt = derive_salt(
            signer,
            request.round_id,
            request.identifier,
            request.time,
            &request.ancillary_data,
        )
        .await?;
        let hash = commit_hash(
            request.price,
            salt,
            delegator,
            request.time,
            &request.ancillary_data,
            request.round_id,
            request.identifier,
        );
        let calldata: Bytes = IVotingV2::commitAndEmitEncryptedVoteCall {
            identifier: request.identifier,
            time: request.time,
            ancillaryData: request.ancillary_data.clone(),
            hash,
            // The contract accepts an empty encrypted payload; the salt
            // is rederived from the delegate key at reveal time instead.
            encryptedVote: Bytes::new(),
        }
        .abi_encode()
        .into();

        if simulator.simulate(delegate, calldata.clone()).await {
            calls.push(calldata);
        } else {
            // The request still needs a vote we could not place.
            outcomes.push(ActionOutcome::default());
        }
    }

    Ok(classify(calls, outcomes))
}

/// Builds the reveal payload for one wallet.
///
/// A request is revealed only when our own delegate key made the
/// commit: the salt cannot be rederived for a commit hashed by anyone
/// else. Requests without such a commit are treated as settled for the
/// wallet-level skip rule, since failing the wallet would not make the
/// reveal possible. Each included reveal is simulated individually so
/// one reverting item cannot poison the wallet's whole transaction.
pub async fn build_reveal_batch(
    signer: &(impl Signer + Sync),
    delegator: Address,
    requests: &[FormattedRequest],
    commit_records: &[VoteRecord],
    reveal_records: &[VoteRecord],
    simulator: &dyn CallSimulator,
) -> Result<WalletPlan, BatchError> {
    let delegate = signer.address();
    let mut outcomes = Vec::new();
    let mut calls = Vec::new();

    for request in requests {
        let revealed = search_for_vote(delegator, delegate, request, reveal_records);
        if revealed.found {
            tracing::info!(
                "Reveal already on chain for {} request at time {} (delegate {delegate})",
                request.kind,
                request.time,
            );
            outcomes.push(revealed);
            continue;
        }

        let committed = search_for_vote(delegator, delegate, request, commit_records);
        if !committed.found || !committed.made_by_delegate {
            tracing::warn!(
                "No commit of ours to reveal for {} request at time {} (delegate {delegate})",
                request.kind,
                request.time,
            );
            outcomes.push(ActionOutcome { found: true, ..committed });
            continue;
        }

        let salt = derive_salt(
            signer,
            request.round_id,
            request.identifier,
            request.time,
            &request.ancillary_data,
        )
        .await?;
        let calldata: Bytes = IVotingV2::revealVoteCall {
            identifier: request.identifier,
            time: request.time,
            price: request.price,
            ancillaryData: request.ancillary_data.clone(),
            salt,
        }
        .abi_encode()
        .into();

        if simulator.simulate(delegate, calldata.clone()).await {
            calls.push(calldata);
        } else {
            // The commit is ours but the reveal cannot land.
            outcomes.push(ActionOutcome::default());
        }
    }

    Ok(classify(calls, outcomes))
}

fn classify(calls: Vec<Bytes>, outcomes: Vec<ActionOutcome>) -> WalletPlan {
    if !calls.is_empty() {
        let items = calls.len();
        let calldata = if items == 1 {
            calls.into_iter().next().unwrap_or_default()
        } else {
            IVotingV2::multicallCall { data: calls }.abi_encode().into()
        };
        return WalletPlan::Submit { calldata, items };
    }
    if should_skip_wallet(&outcomes) {
        WalletPlan::NoAction {
            prior_by_us: prior_work_by_us(&outcomes),
            transaction_hash: outcomes.iter().find_map(|o| o.transaction_hash),
        }
    } else {
        WalletPlan::Unbuildable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::VoteKind;
    use alloy::{
        primitives::{I256, U256},
        signers::local::PrivateKeySigner,
    };
    use uma_voting::PriceIdentifier;

    struct StaticSim(bool);

    #[async_trait]
    impl CallSimulator for StaticSim {
        async fn simulate(&self, _from: Address, _calldata: Bytes) -> bool {
            self.0
        }
    }

    /// Rejects the Nth payload it sees.
    struct RejectNth(std::sync::Mutex<usize>, usize);

    #[async_trait]
    impl CallSimulator for RejectNth {
        async fn simulate(&self, _from: Address, _calldata: Bytes) -> bool {
            let mut seen = self.0.lock().unwrap();
            *seen += 1;
            *seen - 1 != self.1
        }
    }

    fn signer() -> PrivateKeySigner {
        PrivateKeySigner::from_bytes(&B256::from([0x42u8; 32])).unwrap()
    }

    fn delegator() -> Address {
        Address::from([0x22u8; 20])
    }

    fn request(time: u64) -> FormattedRequest {
        FormattedRequest {
            round_id: 7310,
            identifier: B256::from([0x11u8; 32]),
            kind: PriceIdentifier::YesOrNoQuery,
            ancillary_data: Bytes::from(b"anc".to_vec()),
            time: U256::from(time),
            price: I256::ZERO,
            force: false,
        }
    }

    fn record(kind: VoteKind, caller: Address, time: u64) -> VoteRecord {
        VoteRecord {
            kind,
            voter: delegator(),
            caller,
            round_id: 7310,
            identifier: B256::from([0x11u8; 32]),
            time: U256::from(time),
            ancillary_data: Bytes::from(b"anc".to_vec()),
            transaction_hash: Some(B256::from([0xaau8; 32])),
        }
    }

    #[tokio::test]
    async fn commit_skips_already_committed_wallet() {
        let signer = signer();
        let records = vec![record(VoteKind::Commit, signer.address(), 100)];

        let plan = build_commit_batch(
            &signer,
            delegator(),
            &[request(100)],
            &records,
            &StaticSim(true),
        )
        .await
        .unwrap();

        match plan {
            WalletPlan::NoAction { prior_by_us, transaction_hash } => {
                assert!(prior_by_us);
                assert_eq!(transaction_hash, Some(B256::from([0xaau8; 32])));
            }
            other => panic!("expected NoAction, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn commit_not_ours_still_skips_without_credit() {
        let signer = signer();
        // Delegator committed manually.
        let records = vec![record(VoteKind::Commit, delegator(), 100)];

        let plan = build_commit_batch(
            &signer,
            delegator(),
            &[request(100)],
            &records,
            &StaticSim(true),
        )
        .await
        .unwrap();

        match plan {
            WalletPlan::NoAction { prior_by_us, .. } => assert!(!prior_by_us),
            other => panic!("expected NoAction, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn force_overrides_existing_commit() {
        let signer = signer();
        let records = vec![record(VoteKind::Commit, signer.address(), 100)];
        let mut req = request(100);
        req.force = true;

        let plan = build_commit_batch(&signer, delegator(), &[req], &records, &StaticSim(true))
            .await
            .unwrap();

        match plan {
            WalletPlan::Submit { calldata, items } => {
                assert_eq!(items, 1);
                assert_eq!(
                    &calldata[..4],
                    IVotingV2::commitAndEmitEncryptedVoteCall::SELECTOR
                );
            }
            other => panic!("expected Submit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn multiple_items_fold_into_multicall() {
        let signer = signer();

        let plan = build_commit_batch(
            &signer,
            delegator(),
            &[request(100), request(200)],
            &[],
            &StaticSim(true),
        )
        .await
        .unwrap();

        match plan {
            WalletPlan::Submit { calldata, items } => {
                assert_eq!(items, 2);
                assert_eq!(&calldata[..4], IVotingV2::multicallCall::SELECTOR);
            }
            other => panic!("expected Submit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn simulation_failure_drops_item_only() {
        let signer = signer();
        let sim = RejectNth(std::sync::Mutex::new(0), 0);

        let plan =
            build_commit_batch(&signer, delegator(), &[request(100), request(200)], &[], &sim)
                .await
                .unwrap();

        match plan {
            WalletPlan::Submit { calldata, items } => {
                assert_eq!(items, 1);
                assert_eq!(
                    &calldata[..4],
                    IVotingV2::commitAndEmitEncryptedVoteCall::SELECTOR
                );
            }
            other => panic!("expected Submit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn all_simulations_failing_leaves_wallet_unbuildable() {
        let signer = signer();

        let plan = build_commit_batch(
            &signer,
            delegator(),
            &[request(100)],
            &[],
            &StaticSim(false),
        )
        .await
        .unwrap();

        assert!(matches!(plan, WalletPlan::Unbuildable));
    }

    #[tokio::test]
    async fn reveal_requires_commit_made_by_delegate() {
        let signer = signer();
        let commits = vec![record(VoteKind::Commit, signer.address(), 100)];

        let plan = build_reveal_batch(
            &signer,
            delegator(),
            &[request(100)],
            &commits,
            &[],
            &StaticSim(true),
        )
        .await
        .unwrap();

        match plan {
            WalletPlan::Submit { calldata, items } => {
                assert_eq!(items, 1);
                assert_eq!(&calldata[..4], IVotingV2::revealVoteCall::SELECTOR);
            }
            other => panic!("expected Submit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reveal_skips_commit_made_by_someone_else() {
        let signer = signer();
        // Commit exists but was hashed by the delegator's own key; we
        // cannot rederive that salt, so the wallet is settled-skipped.
        let commits = vec![record(VoteKind::Commit, delegator(), 100)];

        let plan = build_reveal_batch(
            &signer,
            delegator(),
            &[request(100)],
            &commits,
            &[],
            &StaticSim(true),
        )
        .await
        .unwrap();

        match plan {
            WalletPlan::NoAction { prior_by_us, .. } => assert!(!prior_by_us),
            other => panic!("expected NoAction, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reveal_skips_missing_commit() {
        let signer = signer();

        let plan =
            build_reveal_batch(&signer, delegator(), &[request(100)], &[], &[], &StaticSim(true))
                .await
                .unwrap();

        assert!(matches!(plan, WalletPlan::NoAction { prior_by_us: false, .. }));
    }

    #[tokio::test]
    async fn reveal_skips_already_revealed() {
        let signer = signer();
        let commits = vec![record(VoteKind::Commit, signer.address(), 100)];
        let reveals = vec![record(VoteKind::Reveal, signer.address(), 100)];

        let plan = build_reveal_batch(
            &signer,
            delegator(),
            &[request(100)],
            &commits,
            &reveals,
            &StaticSim(true),
        )
        .await
        .unwrap();

        match plan {
            WalletPlan::NoAction { prior_by_us, .. } => assert!(prior_by_us),
            other => panic!("expected NoAction, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reveal_mixed_pending_and_settled_submits_single_call() {
        let signer = signer();
        // First request committed by us and unrevealed; second has no
        // commit at all.
        let commits = vec![record(VoteKind::Commit, signer.address(), 100)];

        let plan = build_reveal_batch(
            &signer,
            delegator(),
            &[request(100), request(200)],
            &commits,
            &[],
            &StaticSim(true),
        )
        .await
        .unwrap();

        match plan {
            WalletPlan::Submit { items, .. } => assert_eq!(items, 1),
            other => panic!("expected Submit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reveal_simulation_failure_drops_item_only() {
        let signer = signer();
        let commits = vec![
            record(VoteKind::Commit, signer.address(), 100),
            record(VoteKind::Commit, signer.address(), 200),
        ];
        // First reveal payload reverts in simulation; the second must
        // still go out.
        let sim = RejectNth(std::sync::Mutex::new(0), 0);

        let plan = build_reveal_batch(
            &signer,
            delegator(),
            &[request(100), request(200)],
            &commits,
            &[],
            &sim,
        )
        .await
        .unwrap();

        match plan {
            WalletPlan::Submit { calldata, items } => {
                assert_eq!(items, 1);
                assert_eq!(&calldata[..4], IVotingV2::revealVoteCall::SELECTOR);
            }
            other => panic!("expected Submit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn all_reveal_simulations_failing_leaves_wallet_unbuildable() {
        let signer = signer();
        let commits = vec![record(VoteKind::Commit, signer.address(), 100)];

        let plan = build_reveal_batch(
            &signer,
            delegator(),
            &[request(100)],
            &commits,
            &[],
            &StaticSim(false),
        )
        .await
        .unwrap();

        assert!(matches!(plan, WalletPlan::Unbuildable));
    }
}
