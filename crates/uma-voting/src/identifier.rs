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

use alloy::primitives::B256;

/// The closed set of price identifiers this voter knows how to encode.
///
/// Voting with the wrong encoding corrupts the vote, so anything outside
/// this set is a hard decode failure, never a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceIdentifier {
    /// UMIP-107.
    YesOrNoQuery,
    /// Used by Story Protocol disputes.
    AssertTruth,
    /// Governance votes. On-chain identifiers carry a numeric suffix
    /// (e.g. "Admin 206") that is ignored for classification.
    Admin,
    /// UMIP-179 relay validity.
    AcrossV2,
    /// UMIP-183.
    MultipleValues,
}

impl PriceIdentifier {
    /// Decodes a raw on-chain `bytes32` identifier into a supported kind.
    ///
    /// The raw value is a zero-padded UTF-8 string. Trailing padding and
    /// embedded NUL bytes are stripped, then any identifier starting with
    /// "Admin" collapses to [`PriceIdentifier::Admin`]. Returns `None`
    /// for unsupported kinds (logged, never silently defaulted).
    pub fn decode(raw: &B256) -> Option<PriceIdentifier> {
        let bytes = raw.as_slice();
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        let decoded = match std::str::from_utf8(&bytes[..end]) {
            Ok(s) => s.replace('\0', ""),
            Err(err) => {
                tracing::error!("Identifier {raw} is not valid UTF-8: {err}");
                return None;
            }
        };

        let kind = if decoded.starts_with("Admin") { "Admin" } else { decoded.as_str() };
        match kind {
            "YES_OR_NO_QUERY" => Some(PriceIdentifier::YesOrNoQuery),
            "ASSERT_TRUTH" => Some(PriceIdentifier::AssertTruth),
            "Admin" => Some(PriceIdentifier::Admin),
            "ACROSS-V2" => Some(PriceIdentifier::AcrossV2),
            "MULTIPLE_VALUES" => Some(PriceIdentifier::MultipleValues),
            other => {
                tracing::error!("Price identifier '{other}' not supported");
                None
            }
        }
    }
}

impl std::fmt::Display for PriceIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PriceIdentifier::YesOrNoQuery => "YES_OR_NO_QUERY",
            PriceIdentifier::AssertTruth => "ASSERT_TRUTH",
            PriceIdentifier::Admin => "Admin",
            PriceIdentifier::AcrossV2 => "ACROSS-V2",
            PriceIdentifier::MultipleValues => "MULTIPLE_VALUES",
        };
        write!(f, "{name}")
    }
}
