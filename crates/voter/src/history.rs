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

//! Matching of the current round's requests against the chain's recent
//! commit/reveal history. Records are decoded once at the network
//! boundary ([`crate::chain::VotingChain::vote_history`]) and treated
//! as plain data from there on; outcomes are recomputed fresh on every
//! run, never cached across runs.

use alloy::primitives::{Address, Bytes, B256, U256};

use crate::{config::defaults, formatter::FormattedRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteKind {
    Commit,
    Reveal,
}

/// One past commit or reveal, as decoded from a `VoteCommitted` or
/// `VoteRevealed` log.
#[derive(Debug, Clone)]
pub struct VoteRecord {
    pub kind: VoteKind,
    /// The staked account the vote counts for (the delegator).
    pub voter: Address,
    /// The key that submitted the transaction.
    pub caller: Address,
    pub round_id: u32,
    pub identifier: B256,
    pub time: U256,
    pub ancillary_data: Bytes,
    pub transaction_hash: Option<B256>,
}

/// What the history scan concluded for one `(wallet, request)` pair.
#[derive(Debug, Clone, Default)]
pub struct ActionOutcome {
    pub found: bool,
    pub transaction_hash: Option<B256>,
    pub made_by_delegator: bool,
    pub made_by_delegate: bool,
}

/// Number of blocks covered by the history scan.
pub fn lookback_blocks(lookback_days: u64) -> u64 {
    lookback_days * defaults::blocks_per_day()
}

/// Scans `records` for a vote on `request` counted for `delegator`.
///
/// A record matches only when every identifying field agrees: voter,
/// round, identifier, time, and the full ancillary data. The caller
/// fields distinguish our own prior work from votes placed through
/// another channel (e.g. the delegator voting manually).
pub fn search_for_vote(
    delegator: Address,
    delegate: Address,
    request: &FormattedRequest,
    records: &[VoteRecord],
) -> ActionOutcome {
    for record in records {
        if record.voter == delegator
            && record.round_id == request.round_id
            && record.identifier == request.identifier
            && record.time == request.time
            && record.ancillary_data == request.ancillary_data
        {
            return ActionOutcome {
                found: true,
                transaction_hash: record.transaction_hash,
                made_by_delegator: record.caller == delegator,
                made_by_delegate: record.caller == delegate,
            };
        }
    }
    ActionOutcome::default()
}

/// A wallet with nothing left to do: every request already has a
/// matching vote on chain.
pub fn should_skip_wallet(outcomes: &[ActionOutcome]) -> bool {
    !outcomes.is_empty() && outcomes.iter().all(|o| o.found)
}

/// Whether any of the matched votes was submitted by this
/// orchestrator's own delegate key.
pub fn prior_work_by_us(outcomes: &[ActionOutcome]) -> bool {
    outcomes.iter().any(|o| o.made_by_delegate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::I256;
    use uma_voting::PriceIdentifier;

    fn request(time: u64, ancillary: &[u8]) -> FormattedRequest {
        FormattedRequest {
            round_id: 7310,
            identifier: B256::from([0x11u8; 32]),
            kind: PriceIdentifier::YesOrNoQuery,
            ancillary_data: Bytes::from(ancillary.to_vec()),
            time: U256::from(time),
            price: I256::ZERO,
            force: false,
        }
    }

    fn record(voter: Address, caller: Address, time: u64, ancillary: &[u8]) -> VoteRecord {
        VoteRecord {
            kind: VoteKind::Commit,
            voter,
            caller,
            round_id: 7310,
            identifier: B256::from([0x11u8; 32]),
            time: U256::from(time),
            ancillary_data: Bytes::from(ancillary.to_vec()),
            transaction_hash: Some(B256::from([0xaau8; 32])),
        }
    }

    const DELEGATOR: Address = Address::new([0x22u8; 20]);
    const DELEGATE: Address = Address::new([0x33u8; 20]);

    #[test]
    fn match_requires_every_field() {
        let req = request(100, b"anc");
        let records = vec![
            // Wrong voter.
            record(Address::new([0x99u8; 20]), DELEGATE, 100, b"anc"),
            // Wrong time.
            record(DELEGATOR, DELEGATE, 101, b"anc"),
            // Wrong ancillary data.
            record(DELEGATOR, DELEGATE, 100, b"other"),
        ];
        assert!(!search_for_vote(DELEGATOR, DELEGATE, &req, &records).found);

        let exact = record(DELEGATOR, DELEGATE, 100, b"anc");
        let outcome = search_for_vote(DELEGATOR, DELEGATE, &req, &[exact]);
        assert!(outcome.found);
        assert!(outcome.made_by_delegate);
        assert!(!outcome.made_by_delegator);
        assert_eq!(outcome.transaction_hash, Some(B256::from([0xaau8; 32])));
    }

    #[test]
    fn caller_attribution() {
        let req = request(100, b"anc");

        // Delegator voted for themselves through another channel.
        let manual = record(DELEGATOR, DELEGATOR, 100, b"anc");
        let outcome = search_for_vote(DELEGATOR, DELEGATE, &req, &[manual]);
        assert!(outcome.found);
        assert!(outcome.made_by_delegator);
        assert!(!outcome.made_by_delegate);

        // Some third party committed on their behalf.
        let third = record(DELEGATOR, Address::new([0x44u8; 20]), 100, b"anc");
        let outcome = search_for_vote(DELEGATOR, DELEGATE, &req, &[third]);
        assert!(outcome.found);
        assert!(!outcome.made_by_delegator);
        assert!(!outcome.made_by_delegate);
    }

    #[test]
    fn skip_rule_requires_all_found() {
        let found = ActionOutcome { found: true, ..Default::default() };
        let missing = ActionOutcome::default();

        assert!(should_skip_wallet(&[found.clone(), found.clone()]));
        assert!(!should_skip_wallet(&[found.clone(), missing]));
        assert!(!should_skip_wallet(&[]));
        assert!(should_skip_wallet(&[found]));
    }

    #[test]
    fn prior_work_attribution() {
        let ours = ActionOutcome { found: true, made_by_delegate: true, ..Default::default() };
        let theirs = ActionOutcome { found: true, made_by_delegator: true, ..Default::default() };

        assert!(prior_work_by_us(&[theirs.clone(), ours]));
        assert!(!prior_work_by_us(&[theirs]));
        assert!(!prior_work_by_us(&[]));
    }

    #[test]
    fn lookback_window() {
        assert_eq!(lookback_blocks(2), 15_000);
        assert_eq!(lookback_blocks(0), 0);
    }
}
