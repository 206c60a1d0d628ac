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

use alloy::primitives::{I256, U256};

use crate::identifier::PriceIdentifier;

/// Answer synonyms accepted for the boolean-style identifiers.
const YES_ANSWERS: [&str; 5] = ["yes", "true", "valid", "p2", "1"];
const NO_ANSWERS: [&str; 5] = ["no", "false", "invalid", "p1", "0"];

const ONE_SCALED: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);
const HALF_SCALED: U256 = U256::from_limbs([500_000_000_000_000_000, 0, 0, 0]);

/// Maps a human answer string to the exact on-chain price value.
///
/// Encoding is a pure function of the answer and the identifier kind;
/// anything that does not match yields `None` so the caller drops the
/// item instead of submitting a guessed vote.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceCodec {
    /// Deployment-time policy: when set, every governance (`Admin`)
    /// answer encodes as approval regardless of its literal text.
    pub auto_approve_governance: bool,
}

impl PriceCodec {
    pub fn new(auto_approve_governance: bool) -> Self {
        Self { auto_approve_governance }
    }

    // Constants observed in reveal transactions on chain.
    pub fn p1_value() -> I256 {
        I256::ZERO
    }

    pub fn p2_value() -> I256 {
        I256::from_raw(ONE_SCALED)
    }

    pub fn p3_value() -> I256 {
        I256::from_raw(HALF_SCALED)
    }

    /// "Early request" magic value, -2^255.
    pub fn p4_value() -> I256 {
        I256::MIN
    }

    /// Encodes `answer` for the given identifier kind, or `None` when no
    /// mapping exists.
    pub fn encode(&self, answer: &str, kind: PriceIdentifier) -> Option<I256> {
        match kind {
            PriceIdentifier::YesOrNoQuery => match answer {
                "P1" => Some(Self::p1_value()),
                "P2" => Some(Self::p2_value()),
                "P3" => Some(Self::p3_value()),
                "P4" => Some(Self::p4_value()),
                _ => None,
            },
            PriceIdentifier::AssertTruth | PriceIdentifier::AcrossV2 => {
                self.encode_boolean(answer)
            }
            PriceIdentifier::Admin => {
                if self.auto_approve_governance {
                    Some(Self::p2_value())
                } else {
                    self.encode_boolean(answer)
                }
            }
            // Bit-packing of several sub-values is a known future
            // extension; for now a single integer passes through
            // verbatim, anywhere in the int256 range.
            PriceIdentifier::MultipleValues => I256::from_dec_str(answer.trim()).ok(),
        }
    }

    fn encode_boolean(&self, answer: &str) -> Option<I256> {
        let answer = answer.to_lowercase();
        if YES_ANSWERS.contains(&answer.as_str()) {
            Some(Self::p2_value())
        } else if NO_ANSWERS.contains(&answer.as_str()) {
            Some(Self::p1_value())
        } else {
            None
        }
    }
}
