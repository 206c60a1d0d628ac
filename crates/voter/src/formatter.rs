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

use alloy::primitives::{Bytes, B256, I256, U256};
use thiserror::Error;
use uma_voting::{
    contracts::IVotingV2::PendingRequestAncillaryAugmented, PriceCodec, PriceIdentifier,
};

use crate::{answers::Answer, errors::CodedError, impl_coded_debug};

/// A pending request joined with its curated answer and encoded price.
/// Immutable once built; everything downstream (salt, commit hash,
/// calldata) derives from these fields.
#[derive(Debug, Clone)]
pub struct FormattedRequest {
    pub round_id: u32,
    pub identifier: B256,
    pub kind: PriceIdentifier,
    pub ancillary_data: Bytes,
    pub time: U256,
    pub price: I256,
    /// Commit again even if a commit already exists on chain.
    pub force: bool,
}

#[derive(Error)]
pub enum FormatError {
    #[error("No pending requests in the current round")]
    NoPendingRequests,

    #[error("Answer count {answers} does not match pending request count {requests}")]
    CountMismatch { answers: usize, requests: usize },
}

impl_coded_debug!(FormatError);

impl CodedError for FormatError {
    fn code(&self) -> &str {
        match self {
            FormatError::NoPendingRequests => "[V-FMT-2001]",
            FormatError::CountMismatch { .. } => "[V-FMT-2002]",
        }
    }
}

/// Joins pending requests with answers and encodes each price.
///
/// A count mismatch fails the whole batch: it means the answer file was
/// curated against a different view of the round, and matching "most"
/// of it risks voting with stale answers. Individual items that cannot
/// be matched or encoded are dropped with a log line and the rest of
/// the batch proceeds.
pub fn format_requests(
    pending: &[PendingRequestAncillaryAugmented],
    answers: &[Answer],
    codec: &PriceCodec,
) -> Result<Vec<FormattedRequest>, FormatError> {
    if pending.is_empty() {
        return Err(FormatError::NoPendingRequests);
    }
    if answers.len() != pending.len() {
        return Err(FormatError::CountMismatch { answers: answers.len(), requests: pending.len() });
    }

    let mut formatted = Vec::with_capacity(pending.len());
    for request in pending {
        let key = request.ancillaryData.to_string();
        let Some(answer) = answers.iter().find(|a| a.ancillary_data.to_lowercase() == key) else {
            tracing::warn!("No answer matches ancillary data {key}, dropping request");
            continue;
        };
        if answer.skip {
            tracing::info!("Answer for {key} is flagged skip, dropping request");
            continue;
        }
        // Decode failures log their own error.
        let Some(kind) = PriceIdentifier::decode(&request.identifier) else {
            continue;
        };
        let Some(price) = codec.encode(&answer.answer, kind) else {
            tracing::error!("Answer '{}' has no price encoding for {kind}", answer.answer);
            continue;
        };
        formatted.push(FormattedRequest {
            round_id: request.lastVotingRound,
            identifier: request.identifier,
            kind,
            ancillary_data: request.ancillaryData.clone(),
            time: U256::from(request.time),
            price,
            force: answer.force,
        });
    }
    Ok(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifier_bytes(s: &str) -> B256 {
        let mut bytes = [0u8; 32];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        B256::from(bytes)
    }

    fn pending(identifier: &str, ancillary: &[u8], time: u64) -> PendingRequestAncillaryAugmented {
        PendingRequestAncillaryAugmented {
            lastVotingRound: 7310,
            isGovernance: false,
            time,
            rollCount: 0,
            identifier: identifier_bytes(identifier),
            ancillaryData: Bytes::from(ancillary.to_vec()),
        }
    }

    fn answer(ancillary: &[u8], text: &str) -> Answer {
        Answer {
            ancillary_data: format!("0x{}", hex::encode(ancillary)),
            answer: text.into(),
            skip: false,
            force: false,
        }
    }

    #[test]
    fn three_requests_encode_in_order() {
        let pending = vec![
            pending("YES_OR_NO_QUERY", b"q1", 100),
            pending("YES_OR_NO_QUERY", b"q2", 200),
            pending("YES_OR_NO_QUERY", b"q3", 300),
        ];
        let answers =
            vec![answer(b"q1", "P1"), answer(b"q2", "P2"), answer(b"q3", "P1")];

        let formatted = format_requests(&pending, &answers, &PriceCodec::default()).unwrap();
        assert_eq!(formatted.len(), 3);
        assert_eq!(formatted[0].price, I256::ZERO);
        assert_eq!(formatted[1].price, I256::try_from(1_000_000_000_000_000_000u128).unwrap());
        assert_eq!(formatted[2].price, I256::ZERO);
        assert_eq!(formatted[0].time, U256::from(100));
        assert_eq!(formatted[0].round_id, 7310);
        assert!(!formatted[0].force);
    }

    #[test]
    fn count_mismatch_fails_whole_batch() {
        let pending = vec![
            pending("YES_OR_NO_QUERY", b"q1", 100),
            pending("YES_OR_NO_QUERY", b"q2", 200),
            pending("YES_OR_NO_QUERY", b"q3", 300),
        ];
        let answers = vec![answer(b"q1", "P1"), answer(b"q2", "P2")];

        let err = format_requests(&pending, &answers, &PriceCodec::default()).unwrap_err();
        assert!(matches!(err, FormatError::CountMismatch { answers: 2, requests: 3 }));
    }

    #[test]
    fn empty_round_fails() {
        let err = format_requests(&[], &[], &PriceCodec::default()).unwrap_err();
        assert!(matches!(err, FormatError::NoPendingRequests));
    }

    #[test]
    fn unmatched_and_skipped_items_drop_but_batch_continues() {
        let pending = vec![
            pending("YES_OR_NO_QUERY", b"q1", 100),
            pending("YES_OR_NO_QUERY", b"q2", 200),
            pending("YES_OR_NO_QUERY", b"q3", 300),
        ];
        let mut skipped = answer(b"q2", "P2");
        skipped.skip = true;
        // First answer keys ancillary data that matches no request.
        let answers = vec![answer(b"zz", "P1"), skipped, answer(b"q3", "P2")];

        let formatted = format_requests(&pending, &answers, &PriceCodec::default()).unwrap();
        assert_eq!(formatted.len(), 1);
        assert_eq!(formatted[0].ancillary_data, Bytes::from(b"q3".to_vec()));
    }

    #[test]
    fn undecodable_items_drop() {
        let pending = vec![
            pending("NOT_A_REAL_KIND", b"q1", 100),
            pending("YES_OR_NO_QUERY", b"q2", 200),
        ];
        // q2's answer is not a valid P-token for YES_OR_NO_QUERY.
        let answers = vec![answer(b"q1", "P1"), answer(b"q2", "perhaps")];

        let formatted = format_requests(&pending, &answers, &PriceCodec::default()).unwrap();
        assert!(formatted.is_empty());
    }

    #[test]
    fn force_flag_carries_through() {
        let pending = vec![pending("YES_OR_NO_QUERY", b"q1", 100)];
        let mut forced = answer(b"q1", "P2");
        forced.force = true;

        let formatted = format_requests(&pending, &[forced], &PriceCodec::default()).unwrap();
        assert!(formatted[0].force);
    }

    #[test]
    fn ancillary_match_is_case_insensitive() {
        let pending = vec![pending("YES_OR_NO_QUERY", &[0xab, 0xcd], 100)];
        let mut upper = answer(&[0xab, 0xcd], "P2");
        upper.ancillary_data = "0xABCD".into();

        let formatted = format_requests(&pending, &[upper], &PriceCodec::default()).unwrap();
        assert_eq!(formatted.len(), 1);
    }
}
