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

use alloy::{
    primitives::{keccak256, Address, Bytes, B256, I256, U256},
    signers::Signer,
    sol_types::SolValue,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaltError {
    #[error("signature error: {0}")]
    Signature(#[from] alloy::signers::Error),
}

/// Derives the secret blinding salt for one `(voter key, request)` pair.
///
/// The delegate key signs the packed encoding of
/// `(uint256 roundId, bytes32 identifier, int256 time, bytes ancillaryData)`
/// and the signature is reduced into the `int256` salt domain. ECDSA
/// signing here is deterministic (RFC 6979), so the same key and request
/// always reproduce the same salt: the commit hash can be recomputed at
/// reveal time without ever persisting the salt, and only the key holder
/// can reproduce it.
pub async fn derive_salt(
    signer: &(impl Signer + Sync),
    round_id: u32,
    identifier: B256,
    time: U256,
    ancillary_data: &Bytes,
) -> Result<I256, SaltError> {
    let message = (
        U256::from(round_id),
        identifier,
        I256::from_raw(time),
        ancillary_data.clone(),
    )
        .abi_encode_packed();
    let signature = signer.sign_message(&message).await?;

    // Fold the signature into [0, 2^255 - 1) so it fits the protocol's
    // signed 256-bit salt field.
    let bound = (U256::from(1u8) << 255) - U256::from(1u8);
    let word = U256::from_be_slice(&signature.as_bytes()[..32]);
    Ok(I256::from_raw(word % bound))
}

/// Computes the vote commitment exactly as the VotingV2 contract does:
///
/// `keccak256(abi.encodePacked(price, salt, voter, time, ancillaryData,
/// uint256(roundId), identifier))`
///
/// The field order and typing must be preserved bit for bit or the
/// reveal will not match the stored commitment.
pub fn commit_hash(
    price: I256,
    salt: I256,
    voter: Address,
    time: U256,
    ancillary_data: &Bytes,
    round_id: u32,
    identifier: B256,
) -> B256 {
    let packed = (
        price,
        salt,
        voter,
        time,
        ancillary_data.clone(),
        U256::from(round_id),
        identifier,
    )
        .abi_encode_packed();
    keccak256(&packed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::signers::local::PrivateKeySigner;

    fn test_signer() -> PrivateKeySigner {
        PrivateKeySigner::from_bytes(&B256::from([0x42u8; 32])).unwrap()
    }

    fn test_request() -> (u32, B256, U256, Bytes) {
        (7310, B256::from([0x11u8; 32]), U256::from(1_724_000_000u64), Bytes::from(vec![0xab, 0xcd]))
    }

    #[tokio::test]
    async fn salt_is_deterministic() {
        let signer = test_signer();
        let (round, id, time, anc) = test_request();

        let first = derive_salt(&signer, round, id, time, &anc).await.unwrap();
        let second = derive_salt(&signer, round, id, time, &anc).await.unwrap();
        assert_eq!(first, second);
        assert!(first >= I256::ZERO);
    }

    #[tokio::test]
    async fn salt_differs_per_request_and_key() {
        let signer = test_signer();
        let (round, id, time, anc) = test_request();

        let base = derive_salt(&signer, round, id, time, &anc).await.unwrap();
        let other_round = derive_salt(&signer, round + 1, id, time, &anc).await.unwrap();
        assert_ne!(base, other_round);

        let other_signer = PrivateKeySigner::from_bytes(&B256::from([0x43u8; 32])).unwrap();
        let other_key = derive_salt(&other_signer, round, id, time, &anc).await.unwrap();
        assert_ne!(base, other_key);
    }

    #[test]
    fn commit_hash_is_sensitive_to_every_field() {
        let (round, id, time, anc) = test_request();
        let voter = Address::from([0x77u8; 20]);
        let price = I256::try_from(1_000_000_000_000_000_000u128).unwrap();
        let salt = I256::try_from(12345).unwrap();

        let base = commit_hash(price, salt, voter, time, &anc, round, id);
        assert_ne!(base, commit_hash(I256::ZERO, salt, voter, time, &anc, round, id));
        assert_ne!(base, commit_hash(price, I256::ZERO, voter, time, &anc, round, id));
        assert_ne!(base, commit_hash(price, salt, Address::ZERO, time, &anc, round, id));
        assert_ne!(base, commit_hash(price, salt, voter, time + U256::from(1u8), &anc, round, id));
        assert_ne!(base, commit_hash(price, salt, voter, time, &Bytes::new(), round, id));
        assert_ne!(base, commit_hash(price, salt, voter, time, &anc, round + 1, id));
        assert_ne!(base, commit_hash(price, salt, voter, time, &anc, round, B256::ZERO));
        // Same inputs always reproduce the same commitment.
        assert_eq!(base, commit_hash(price, salt, voter, time, &anc, round, id));
    }
}
