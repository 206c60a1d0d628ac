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

//! Drives all wallets through a round in two passes: sequential
//! submission (nonce ordering, bounded per-wallet time) followed by
//! concurrent receipt confirmation. A wallet's failure, timeout, or
//! revert never affects any other wallet.

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use tokio::time::Duration;

/// Final bucket for one wallet's round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletClass {
    Successful,
    Skipped,
    Failed,
}

#[derive(Debug, Clone)]
pub struct WalletResult {
    pub delegate: Address,
    pub class: WalletClass,
    pub transaction_hash: Option<B256>,
}

/// What the submission pass concluded for one wallet.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Nothing left to do. `prior_by_us` distinguishes work this
    /// orchestrator did in an earlier run from votes placed elsewhere.
    NoAction { prior_by_us: bool, transaction_hash: Option<B256> },
    Submitted { tx_hash: B256 },
    Failed,
}

/// One wallet's work, split at the submit/confirm seam so the runner
/// can be exercised without a chain.
#[async_trait]
pub trait WalletAction: Send + Sync {
    fn delegate(&self) -> Address;
    /// Builds and submits this wallet's transaction, if one is needed.
    async fn submit(&self) -> SubmitOutcome;
    /// Waits for the receipt of `tx_hash`; true means confirmed.
    async fn confirm(&self, tx_hash: B256) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct RunnerTiming {
    /// Bound on one wallet's whole submission step.
    pub action_timeout: Duration,
    /// Pause after each wallet that submitted (except the last wallet).
    pub submit_delay: Duration,
    /// Shared bound on each receipt wait in the confirmation pass.
    pub receipt_timeout: Duration,
}

/// Runs every wallet through submission then confirmation.
///
/// Submission is strictly sequential in input order. Confirmation
/// awaits all pending receipts concurrently and never fails fast: each
/// wallet settles into its own bucket independently.
pub async fn run_wallets<A: WalletAction>(actions: &[A], timing: &RunnerTiming) -> Vec<WalletResult> {
    let mut results: Vec<Option<WalletResult>> = (0..actions.len()).map(|_| None).collect();
    let mut submitted: Vec<(usize, B256)> = Vec::new();

    let last = actions.len().saturating_sub(1);
    for (idx, action) in actions.iter().enumerate() {
        let delegate = action.delegate();
        let outcome = match tokio::time::timeout(timing.action_timeout, action.submit()).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!("Wallet {delegate} timed out during submission");
                SubmitOutcome::Failed
            }
        };

        let did_submit = matches!(outcome, SubmitOutcome::Submitted { .. });
        match outcome {
            SubmitOutcome::NoAction { prior_by_us, transaction_hash } => {
                let class = if prior_by_us { WalletClass::Successful } else { WalletClass::Skipped };
                tracing::info!("Wallet {delegate} has nothing to submit ({class:?})");
                results[idx] = Some(WalletResult { delegate, class, transaction_hash });
            }
            SubmitOutcome::Submitted { tx_hash } => {
                tracing::info!("Wallet {delegate} submitted {tx_hash}");
                submitted.push((idx, tx_hash));
            }
            SubmitOutcome::Failed => {
                tracing::error!("Wallet {delegate} failed to submit");
                results[idx] =
                    Some(WalletResult { delegate, class: WalletClass::Failed, transaction_hash: None });
            }
        }

        if did_submit && idx != last {
            tokio::time::sleep(timing.submit_delay).await;
        }
    }

    let confirmations = submitted.iter().map(|(idx, tx_hash)| {
        let action = &actions[*idx];
        async move {
            let confirmed =
                match tokio::time::timeout(timing.receipt_timeout, action.confirm(*tx_hash)).await {
                    Ok(confirmed) => confirmed,
                    Err(_) => {
                        tracing::error!(
                            "Timed out waiting for receipt {tx_hash} (wallet {})",
                            action.delegate()
                        );
                        false
                    }
                };
            (*idx, *tx_hash, confirmed)
        }
    });

    for (idx, tx_hash, confirmed) in futures::future::join_all(confirmations).await {
        let delegate = actions[idx].delegate();
        let class = if confirmed { WalletClass::Successful } else { WalletClass::Failed };
        results[idx] =
            Some(WalletResult { delegate, class, transaction_hash: Some(tx_hash) });
    }

    results.into_iter().flatten().collect()
}
