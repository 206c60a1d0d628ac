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

//! One full commit or reveal run: precondition checks, request
//! formatting, per-wallet batch building, the two-pass runner, and
//! outcome recording. Preconditions abort before any wallet is touched.

use std::sync::Arc;

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Duration;
use uma_voting::{contracts::VotePhase, PriceCodec};

use crate::{
    answers::{AnswerError, AnswerSource},
    batch::{build_commit_batch, build_reveal_batch, WalletPlan},
    chain::{ChainError, VotingChain},
    config::Config,
    delegates::DelegateWallet,
    errors::CodedError,
    formatter::{format_requests, FormatError, FormattedRequest},
    history::{lookback_blocks, VoteKind, VoteRecord},
    impl_coded_debug,
    outcome::OutcomeSink,
    runner::{run_wallets, RunnerTiming, SubmitOutcome, WalletAction, WalletClass, WalletResult},
};

#[derive(Error)]
pub enum RoundError {
    #[error("Round is in {actual} phase, expected {expected}")]
    WrongPhase { expected: VotePhase, actual: VotePhase },

    #[error("No pending requests in the current round")]
    NoPendingRequests,

    #[error("No voting wallets configured")]
    NoWallets,

    #[error("No actionable requests after formatting")]
    NoActionableRequests,

    #[error("{0}")]
    Chain(#[from] ChainError),

    #[error("{0}")]
    Answers(#[from] AnswerError),

    #[error("{0}")]
    Format(#[from] FormatError),

    #[error(transparent)]
    Sink(#[from] anyhow::Error),
}

impl_coded_debug!(RoundError);

impl CodedError for RoundError {
    fn code(&self) -> &str {
        match self {
            RoundError::WrongPhase { .. } => "[V-RND-6001]",
            RoundError::NoPendingRequests => "[V-RND-6002]",
            RoundError::NoWallets => "[V-RND-6003]",
            RoundError::NoActionableRequests => "[V-RND-6004]",
            RoundError::Chain(inner) => inner.code(),
            RoundError::Answers(inner) => inner.code(),
            RoundError::Format(inner) => inner.code(),
            RoundError::Sink(_) => "[V-RND-6005]",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RoundSummary {
    pub round_id: u32,
    pub phase: VotePhase,
    pub successful: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RoundSummary {
    fn tally(round_id: u32, phase: VotePhase, results: &[WalletResult]) -> Self {
        let count = |class| results.iter().filter(|r| r.class == class).count();
        Self {
            round_id,
            phase,
            successful: count(WalletClass::Successful),
            skipped: count(WalletClass::Skipped),
            failed: count(WalletClass::Failed),
        }
    }
}

/// Phase and pending-request view for the `status` subcommand.
#[derive(Debug, Clone, Copy)]
pub struct StatusInfo {
    pub phase: VotePhase,
    pub pending: usize,
    pub round_id: Option<u32>,
}

pub struct RoundContext<'a, P> {
    pub wallets: Vec<DelegateWallet<P>>,
    pub config: Config,
    pub answers: &'a dyn AnswerSource,
    pub sink: &'a dyn OutcomeSink,
}

/// One wallet's work for the round, bound to its own provider.
struct VoteAction<P> {
    wallet: DelegateWallet<P>,
    phase: VotePhase,
    requests: Arc<Vec<FormattedRequest>>,
    commit_records: Arc<Vec<VoteRecord>>,
    reveal_records: Arc<Vec<VoteRecord>>,
    gas_premium_pct: u64,
    receipt_timeout: Duration,
}

#[async_trait]
impl<P: alloy::providers::Provider + Clone + 'static> WalletAction for VoteAction<P> {
    fn delegate(&self) -> Address {
        self.wallet.delegate()
    }

    async fn submit(&self) -> SubmitOutcome {
        let delegate = self.delegate();
        let plan = match self.phase {
            VotePhase::Commit => {
                build_commit_batch(
                    &self.wallet.signer,
                    self.wallet.delegator,
                    &self.requests,
                    &self.commit_records,
                    &self.wallet.chain,
                )
                .await
            }
            VotePhase::Reveal => {
                build_reveal_batch(
                    &self.wallet.signer,
                    self.wallet.delegator,
                    &self.requests,
                    &self.commit_records,
                    &self.reveal_records,
                    &self.wallet.chain,
                )
                .await
            }
        };

        let plan = match plan {
            Ok(plan) => plan,
            Err(err) => {
                tracing::error!("Wallet {delegate} failed to build its batch: {err:?}");
                return SubmitOutcome::Failed;
            }
        };

        match plan {
            WalletPlan::NoAction { prior_by_us, transaction_hash } => {
                SubmitOutcome::NoAction { prior_by_us, transaction_hash }
            }
            WalletPlan::Unbuildable => SubmitOutcome::Failed,
            WalletPlan::Submit { calldata, items } => {
                tracing::info!("Wallet {delegate} submitting {items} {} item(s)", self.phase);
                match self.wallet.chain.submit(delegate, calldata, self.gas_premium_pct).await {
                    Ok(tx_hash) => SubmitOutcome::Submitted { tx_hash },
                    Err(err) => {
                        tracing::error!("Wallet {delegate} failed to submit: {err:?}");
                        SubmitOutcome::Failed
                    }
                }
            }
        }
    }

    async fn confirm(&self, tx_hash: B256) -> bool {
        match self.wallet.chain.wait_for_receipt(tx_hash, self.receipt_timeout).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("Wallet {} confirmation failed: {err:?}", self.delegate());
                false
            }
        }
    }
}

pub async fn run_commit<P: alloy::providers::Provider + Clone + 'static>(
    ctx: RoundContext<'_, P>,
) -> Result<RoundSummary, RoundError> {
    run_round(ctx, VotePhase::Commit).await
}

pub async fn run_reveal<P: alloy::providers::Provider + Clone + 'static>(
    ctx: RoundContext<'_, P>,
) -> Result<RoundSummary, RoundError> {
    run_round(ctx, VotePhase::Reveal).await
}

pub async fn status<P: alloy::providers::Provider + Clone + 'static>(
    chain: &VotingChain<P>,
) -> Result<StatusInfo, RoundError> {
    let phase = chain.current_phase().await?;
    let pending = chain.pending_requests().await?;
    Ok(StatusInfo {
        phase,
        pending: pending.len(),
        round_id: pending.first().map(|r| r.lastVotingRound),
    })
}

async fn run_round<P: alloy::providers::Provider + Clone + 'static>(
    ctx: RoundContext<'_, P>,
    expected: VotePhase,
) -> Result<RoundSummary, RoundError> {
    let Some(first) = ctx.wallets.first() else {
        return Err(RoundError::NoWallets);
    };
    // All reads go through one wallet's provider; they are
    // wallet-independent views of the same contract.
    let chain = first.chain.clone();

    let actual = chain.current_phase().await?;
    if actual != expected {
        return Err(RoundError::WrongPhase { expected, actual });
    }

    let pending = chain.pending_requests().await?;
    if pending.is_empty() {
        return Err(RoundError::NoPendingRequests);
    }
    let round_id = pending[0].lastVotingRound;
    tracing::info!("Round {round_id} {expected}: {} pending request(s)", pending.len());

    let answers = ctx.answers.fetch(round_id).await?;
    let codec = PriceCodec::new(ctx.config.voting.auto_approve_governance);
    let requests = format_requests(&pending, &answers, &codec)?;
    if requests.is_empty() {
        return Err(RoundError::NoActionableRequests);
    }

    let records = chain.vote_history(lookback_blocks(ctx.config.voting.lookback_days)).await?;
    let (commit_records, reveal_records): (Vec<_>, Vec<_>) =
        records.into_iter().partition(|r| r.kind == VoteKind::Commit);

    let requests = Arc::new(requests);
    let commit_records = Arc::new(commit_records);
    let reveal_records = Arc::new(reveal_records);
    let receipt_timeout = Duration::from_secs(ctx.config.txn.receipt_timeout_secs);

    let mut results = Vec::new();
    let mut actions = Vec::new();
    for wallet in ctx.wallets {
        if wallet.delegator == Address::ZERO {
            // A commit hashed over the zero address can never be
            // revealed; fail the wallet before it does anything.
            tracing::error!("Delegate {} has no delegator mapping", wallet.delegate());
            results.push(WalletResult {
                delegate: wallet.delegate(),
                class: WalletClass::Failed,
                transaction_hash: None,
            });
            continue;
        }
        actions.push(VoteAction {
            wallet,
            phase: expected,
            requests: requests.clone(),
            commit_records: commit_records.clone(),
            reveal_records: reveal_records.clone(),
            gas_premium_pct: ctx.config.txn.gas_premium_pct,
            receipt_timeout,
        });
    }

    let timing = RunnerTiming {
        action_timeout: Duration::from_secs(ctx.config.txn.action_timeout_secs),
        submit_delay: Duration::from_secs(ctx.config.txn.submit_delay_secs),
        receipt_timeout,
    };
    results.extend(run_wallets(&actions, &timing).await);

    for result in &results {
        ctx.sink.record(result).await?;
    }

    let summary = RoundSummary::tally(round_id, expected, &results);
    tracing::info!(
        "Round {round_id} {expected} finished: {} successful, {} skipped, {} failed",
        summary.successful,
        summary.skipped,
        summary.failed,
    );
    Ok(summary)
}
