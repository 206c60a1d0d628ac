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
    network::EthereumWallet,
    providers::ProviderBuilder,
    signers::local::PrivateKeySigner,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::fmt::format::FmtSpan;
use voter::{
    answers::GithubAnswerSource,
    chain::VotingChain,
    config::ConfigWatcher,
    delegates::{DelegateWallet, DelegationRegistry, FileRegistry},
    outcome::FileOutcomeSink,
    round::{run_commit, run_reveal, status, RoundContext},
    Args, Command,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_span_events(FmtSpan::CLOSE)
            .init();
    }

    if args.private_keys.is_empty() {
        bail!("No delegate keys provided. Set PRIVATE_KEYS or pass --private-keys");
    }

    let config_watcher =
        ConfigWatcher::new(&args.config_file).await.context("Failed to load voter config")?;
    let config = config_watcher.config.lock_all().context("Failed to read config")?.clone();

    let registry = FileRegistry::load(&args.delegations_file)
        .context("Failed to load delegation registry")?;

    let wallets: Vec<DelegateWallet<_>> = args
        .private_keys
        .iter()
        .map(|signer: &PrivateKeySigner| {
            let provider = ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer.clone()))
                .connect_http(args.rpc_url.clone());
            DelegateWallet {
                signer: signer.clone(),
                delegator: registry.delegator_for(signer.address()),
                chain: VotingChain::new(Arc::new(provider), args.voting_address),
            }
        })
        .collect();

    match args.command {
        Command::Commit | Command::Reveal => {
            let answers = GithubAnswerSource::new(config.voting.answer_base_url.clone());
            let sink = FileOutcomeSink::new(args.outcome_dir.clone());
            let ctx = RoundContext { wallets, config, answers: &answers, sink: &sink };

            let summary = match args.command {
                Command::Commit => run_commit(ctx).await?,
                _ => run_reveal(ctx).await?,
            };
            if summary.failed > 0 {
                bail!("{} wallet(s) failed in round {}", summary.failed, summary.round_id);
            }
        }
        Command::Status => {
            // Reads are wallet-independent; any provider will do.
            let chain = wallets[0].chain.clone();
            let info = status(&chain).await?;
            println!("phase: {}", info.phase);
            println!("pending requests: {}", info.pending);
            if let Some(round_id) = info.round_id {
                println!("round: {round_id}");
            }
        }
    }

    Ok(())
}
