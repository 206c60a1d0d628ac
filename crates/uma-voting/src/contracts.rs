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

use alloy::primitives::{address, Address};
use thiserror::Error;

/// VotingV2 deployment on Ethereum mainnet.
pub const VOTING_V2_ADDRESS: Address = address!("004395edb43EFca9885CEdad51EC9fAf93Bd34ac");

alloy::sol! {
    #[sol(rpc, all_derives)]
    interface IVotingV2 {
        /// Snapshot of a dispute awaiting resolution in the current round,
        /// as returned by `getPendingRequests`.
        struct PendingRequestAncillaryAugmented {
            uint32 lastVotingRound;
            bool isGovernance;
            uint64 time;
            uint32 rollCount;
            bytes32 identifier;
            bytes ancillaryData;
        }

        event VoteCommitted(
            address indexed voter,
            address indexed caller,
            uint32 roundId,
            bytes32 indexed identifier,
            uint256 time,
            bytes ancillaryData
        );

        event VoteRevealed(
            address indexed voter,
            address indexed caller,
            uint32 roundId,
            bytes32 indexed identifier,
            uint256 time,
            bytes ancillaryData,
            int256 price,
            uint128 numTokens
        );

        function getVotePhase() external view returns (uint8);
        function getPendingRequests()
            external
            view
            returns (PendingRequestAncillaryAugmented[] memory);
        function commitAndEmitEncryptedVote(
            bytes32 identifier,
            uint256 time,
            bytes ancillaryData,
            bytes32 hash,
            bytes encryptedVote
        ) external;
        function revealVote(
            bytes32 identifier,
            uint256 time,
            int256 price,
            bytes ancillaryData,
            int256 salt
        ) external;
        function multicall(bytes[] data) external returns (bytes[] results);
    }
}

/// The two sequential windows of a voting round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VotePhase {
    Commit,
    Reveal,
}

#[derive(Error, Debug)]
#[error("unknown vote phase: {0}")]
pub struct UnknownPhase(pub u8);

impl TryFrom<u8> for VotePhase {
    type Error = UnknownPhase;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VotePhase::Commit),
            1 => Ok(VotePhase::Reveal),
            other => Err(UnknownPhase(other)),
        }
    }
}

impl std::fmt::Display for VotePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotePhase::Commit => write!(f, "commit"),
            VotePhase::Reveal => write!(f, "reveal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_from_u8() {
        assert_eq!(VotePhase::try_from(0).unwrap(), VotePhase::Commit);
        assert_eq!(VotePhase::try_from(1).unwrap(), VotePhase::Reveal);
        assert!(VotePhase::try_from(2).is_err());
    }
}
