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

//! Protocol-level types for the UMA VotingV2 commit-reveal oracle:
//! contract bindings, price identifier decoding, answer-to-price
//! encoding, and the salt / commit-hash derivation used by voters.

/// VotingV2 contract bindings and phase helpers.
pub mod contracts;
/// Price identifier decoding.
pub mod identifier;
/// Answer-to-price encoding tables.
pub mod price;
/// Salt derivation and commit hash computation.
pub mod salt;

pub use identifier::PriceIdentifier;
pub use price::PriceCodec;
