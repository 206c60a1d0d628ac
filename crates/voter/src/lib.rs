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

//! Orchestrates commit-reveal voting on the UMA VotingV2 oracle for a
//! pool of delegated wallets: joins pending requests with curated
//! answers, matches the chain's recent history to avoid double voting,
//! and drives every wallet through submission and confirmation while
//! keeping wallet failures isolated from each other.

use std::path::PathBuf;

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use clap::{Parser, Subcommand};
use uma_voting::contracts::VOTING_V2_ADDRESS;
use url::Url;

pub mod answers;
pub mod batch;
pub mod chain;
pub mod config;
pub mod delegates;
pub mod errors;
pub mod formatter;
pub mod history;
pub mod outcome;
pub mod round;
pub mod runner;

/// Arguments of the voter.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// URL of the Ethereum RPC endpoint.
    #[clap(long, env)]
    pub rpc_url: Url,
    /// Delegate private keys, comma separated.
    #[clap(long, env = "PRIVATE_KEYS", value_delimiter = ',', hide_env_values = true)]
    pub private_keys: Vec<PrivateKeySigner>,
    /// Path to the voter TOML config file.
    #[clap(long, default_value = "voter.toml")]
    pub config_file: PathBuf,
    /// Path to the delegate -> delegator JSON mapping.
    #[clap(long, env, default_value = "delegations.json")]
    pub delegations_file: PathBuf,
    /// Directory the per-wallet outcome markers are written to.
    #[clap(long, default_value = "outcomes")]
    pub outcome_dir: PathBuf,
    /// Address of the VotingV2 contract.
    #[clap(long, env, default_value_t = VOTING_V2_ADDRESS)]
    pub voting_address: Address,
    /// Emit logs in JSON format.
    #[clap(long, env)]
    pub log_json: bool,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Commit votes for the current round.
    Commit,
    /// Reveal votes committed earlier in the round.
    Reveal,
    /// Print the current phase and pending-request count.
    Status,
}
