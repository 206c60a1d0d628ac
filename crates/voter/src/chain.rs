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

use std::sync::Arc;

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, B256},
    providers::Provider,
    rpc::types::{Filter, TransactionRequest},
    sol_types::SolEvent,
};
use thiserror::Error;
use tokio::time::Duration;
use uma_voting::contracts::{IVotingV2, UnknownPhase, VotePhase};

use crate::{
    errors::CodedError,
    history::{VoteKind, VoteRecord},
    impl_coded_debug,
};

/// Receipt polling interval during confirmation.
const RECEIPT_POLL_MS: u64 = 2000;

#[derive(Error)]
pub enum ChainError {
    #[error("Contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),

    #[error("RPC request failed: {0}")]
    Rpc(#[from] alloy::transports::TransportError),

    #[error("Failed to decode vote log: {0}")]
    LogDecode(#[from] alloy::sol_types::Error),

    #[error("{0}")]
    Phase(#[from] UnknownPhase),

    #[error("Simulation failed: {0}")]
    SimulationFailed(String),

    #[error("Gas estimation failed: {0}")]
    GasEstimate(String),

    #[error("Transaction {0} reverted")]
    Reverted(B256),

    #[error("Timed out waiting for receipt of {0}")]
    ReceiptTimeout(B256),
}

impl_coded_debug!(ChainError);

impl CodedError for ChainError {
    fn code(&self) -> &str {
        match self {
            ChainError::Contract(_) => "[V-CHA-4001]",
            ChainError::Rpc(_) => "[V-CHA-4002]",
            ChainError::LogDecode(_) => "[V-CHA-4003]",
            ChainError::Phase(_) => "[V-CHA-4004]",
            ChainError::SimulationFailed(_) => "[V-CHA-4005]",
            ChainError::GasEstimate(_) => "[V-CHA-4006]",
            ChainError::Reverted(_) => "[V-CHA-4007]",
            ChainError::ReceiptTimeout(_) => "[V-CHA-4008]",
        }
    }
}

/// Inflates a gas estimate by `premium_pct` percent.
pub(crate) fn apply_gas_premium(estimate: u64, premium_pct: u64) -> u64 {
    estimate.saturating_add(estimate.saturating_mul(premium_pct) / 100)
}

/// All VotingV2 reads and writes go through here. One instance per
/// wallet: the provider carries that wallet's signing key, so `submit`
/// sends as the delegate.
#[derive(Clone)]
pub struct VotingChain<P> {
    provider: Arc<P>,
    voting_address: Address,
}

impl<P: Provider + Clone + 'static> VotingChain<P> {
    pub fn new(provider: Arc<P>, voting_address: Address) -> Self {
        Self { provider, voting_address }
    }

    pub async fn current_phase(&self) -> Result<VotePhase, ChainError> {
        let voting = IVotingV2::new(self.voting_address, self.provider.clone());
        let phase = voting.getVotePhase().call().await?;
        Ok(VotePhase::try_from(phase)?)
    }

    pub async fn pending_requests(
        &self,
    ) -> Result<Vec<IVotingV2::PendingRequestAncillaryAugmented>, ChainError> {
        let voting = IVotingV2::new(self.voting_address, self.provider.clone());
        Ok(voting.getPendingRequests().call().await?)
    }

    /// Fetches and decodes all commit and reveal logs in the last
    /// `lookback` blocks.
    pub async fn vote_history(&self, lookback: u64) -> Result<Vec<VoteRecord>, ChainError> {
        let latest = self.provider.get_block_number().await?;
        let from_block = latest.saturating_sub(lookback);
        let mut records = Vec::new();

        let commits = Filter::new()
            .address(self.voting_address)
            .event_signature(IVotingV2::VoteCommitted::SIGNATURE_HASH)
            .from_block(from_block);
        for log in self.provider.get_logs(&commits).await? {
            let decoded = log.log_decode::<IVotingV2::VoteCommitted>()?;
            let data = decoded.inner.data;
            records.push(VoteRecord {
                kind: VoteKind::Commit,
                voter: data.voter,
                caller: data.caller,
                round_id: data.roundId,
                identifier: data.identifier,
                time: data.time,
                ancillary_data: data.ancillaryData,
                transaction_hash: log.transaction_hash,
            });
        }

        let reveals = Filter::new()
            .address(self.voting_address)
            .event_signature(IVotingV2::VoteRevealed::SIGNATURE_HASH)
            .from_block(from_block);
        for log in self.provider.get_logs(&reveals).await? {
            let decoded = log.log_decode::<IVotingV2::VoteRevealed>()?;
            let data = decoded.inner.data;
            records.push(VoteRecord {
                kind: VoteKind::Reveal,
                voter: data.voter,
                caller: data.caller,
                round_id: data.roundId,
                identifier: data.identifier,
                time: data.time,
                ancillary_data: data.ancillaryData,
                transaction_hash: log.transaction_hash,
            });
        }

        tracing::debug!(
            "Decoded {} vote records from blocks {from_block}..{latest}",
            records.len()
        );
        Ok(records)
    }

    /// Dry-runs `calldata` against the voting contract as `from`.
    pub async fn simulate(&self, from: Address, calldata: Bytes) -> Result<(), ChainError> {
        let req = TransactionRequest::default()
            .with_from(from)
            .with_to(self.voting_address)
            .with_input(calldata);
        self.provider
            .call(req)
            .await
            .map_err(|err| ChainError::SimulationFailed(err.to_string()))?;
        Ok(())
    }

    /// Estimates gas, applies the configured premium, and sends.
    ///
    /// Estimation happens immediately before send so the limit reflects
    /// current chain state, not the state at batch-build time.
    pub async fn submit(
        &self,
        from: Address,
        calldata: Bytes,
        gas_premium_pct: u64,
    ) -> Result<B256, ChainError> {
        let req = TransactionRequest::default()
            .with_from(from)
            .with_to(self.voting_address)
            .with_input(calldata);
        let estimate = self
            .provider
            .estimate_gas(req.clone())
            .await
            .map_err(|err| ChainError::GasEstimate(err.to_string()))?;
        let gas_limit = apply_gas_premium(estimate, gas_premium_pct);
        tracing::debug!("Gas estimate {estimate}, submitting with limit {gas_limit}");

        let pending = self.provider.send_transaction(req.with_gas_limit(gas_limit)).await?;
        Ok(*pending.tx_hash())
    }

    /// Polls for the receipt of `tx_hash` until it lands or `timeout`
    /// elapses. A reverted receipt is an error, not a success.
    pub async fn wait_for_receipt(
        &self,
        tx_hash: B256,
        timeout: Duration,
    ) -> Result<(), ChainError> {
        let poll = async {
            loop {
                if let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? {
                    if receipt.status() {
                        return Ok(());
                    }
                    return Err(ChainError::Reverted(tx_hash));
                }
                tokio::time::sleep(Duration::from_millis(RECEIPT_POLL_MS)).await;
            }
        };
        match tokio::time::timeout(timeout, poll).await {
            Ok(res) => res,
            Err(_) => Err(ChainError::ReceiptTimeout(tx_hash)),
        }
    }
}
