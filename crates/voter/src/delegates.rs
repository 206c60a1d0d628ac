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

use std::{collections::HashMap, path::Path};

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use anyhow::{Context, Result};

use crate::chain::VotingChain;

/// Resolves which staked account (delegator) a hot key (delegate) votes
/// on behalf of.
pub trait DelegationRegistry {
    /// Returns [`Address::ZERO`] when the delegate is unknown; the
    /// caller must fail that wallet before taking any action, since a
    /// commit hashed over the wrong voter address can never be revealed.
    fn delegator_for(&self, delegate: Address) -> Address;
}

/// Delegation map loaded from a JSON file of `delegate -> delegator`
/// address pairs.
pub struct FileRegistry {
    map: HashMap<Address, Address>,
}

impl FileRegistry {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read delegation file: {}", path.display()))?;
        let map: HashMap<Address, Address> =
            serde_json::from_str(&data).context("Failed to parse delegation file")?;
        Ok(Self { map })
    }
}

impl DelegationRegistry for FileRegistry {
    fn delegator_for(&self, delegate: Address) -> Address {
        self.map.get(&delegate).copied().unwrap_or(Address::ZERO)
    }
}

/// One voting wallet: the delegate's signing key, the delegator it
/// votes for, and a provider bound to the delegate key for submission.
#[derive(Clone)]
pub struct DelegateWallet<P> {
    pub signer: PrivateKeySigner,
    pub delegator: Address,
    pub chain: VotingChain<P>,
}

impl<P> DelegateWallet<P> {
    pub fn delegate(&self) -> Address {
        self.signer.address()
    }
}
