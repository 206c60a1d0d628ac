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

use std::{
    path::Path,
    sync::{Arc, RwLock},
};

use crate::{errors::CodedError, impl_coded_debug};
use anyhow::{Context, Result};
use notify::{EventKind, Watcher};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{
    task::JoinHandle,
    time::{timeout, Duration},
};

pub mod defaults {
    /// How far back the vote history scan reaches, in days.
    pub const fn lookback_days() -> u64 {
        2
    }

    /// Mainnet averages ~7200 blocks/day; padded so the window never
    /// undershoots a full commit-reveal round.
    pub const fn blocks_per_day() -> u64 {
        7500
    }

    pub const fn receipt_timeout_secs() -> u64 {
        180
    }

    pub const fn action_timeout_secs() -> u64 {
        240
    }

    pub const fn submit_delay_secs() -> u64 {
        5
    }

    /// Percent added on top of the node's gas estimate. Underestimated
    /// commits have been observed to revert inside multicall.
    pub const fn gas_premium_pct() -> u64 {
        30
    }

    pub fn answer_base_url() -> String {
        "https://raw.githubusercontent.com/uma-rocks/vote-data/main/answers".to_string()
    }
}

#[derive(Error)]
pub enum ConfigErr {
    #[error("Failed to lock internal config structure")]
    LockFailed,

    #[error("Invalid configuration")]
    InvalidConfig,
}

impl_coded_debug!(ConfigErr);

impl CodedError for ConfigErr {
    fn code(&self) -> &str {
        match self {
            ConfigErr::LockFailed => "[V-CON-3001]",
            ConfigErr::InvalidConfig => "[V-CON-3002]",
        }
    }
}

/// Voting-policy section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingConfig {
    /// Days of chain history scanned when matching prior commits/reveals.
    #[serde(default = "defaults::lookback_days")]
    pub lookback_days: u64,
    /// When set, every governance (Admin) request is voted as approval
    /// regardless of the answer file.
    #[serde(default)]
    pub auto_approve_governance: bool,
    /// Base URL the per-round answer file is fetched from.
    #[serde(default = "defaults::answer_base_url")]
    pub answer_base_url: String,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            lookback_days: defaults::lookback_days(),
            auto_approve_governance: false,
            answer_base_url: defaults::answer_base_url(),
        }
    }
}

/// Transaction-handling section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxnConfig {
    /// Upper bound on waiting for a submitted transaction's receipt.
    #[serde(default = "defaults::receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
    /// Upper bound on one wallet's whole build-and-submit step.
    #[serde(default = "defaults::action_timeout_secs")]
    pub action_timeout_secs: u64,
    /// Pause between wallets that actually submitted, to keep nonce and
    /// base-fee churn down.
    #[serde(default = "defaults::submit_delay_secs")]
    pub submit_delay_secs: u64,
    /// Percent premium added to the gas estimate before sending.
    #[serde(default = "defaults::gas_premium_pct")]
    pub gas_premium_pct: u64,
}

impl Default for TxnConfig {
    fn default() -> Self {
        Self {
            receipt_timeout_secs: defaults::receipt_timeout_secs(),
            action_timeout_secs: defaults::action_timeout_secs(),
            submit_delay_secs: defaults::submit_delay_secs(),
            gas_premium_pct: defaults::gas_premium_pct(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub voting: VotingConfig,
    #[serde(default)]
    pub txn: TxnConfig,
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        let data = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&data).context("Failed to parse toml file")
    }
}

#[derive(Clone, Default, Debug)]
pub struct ConfigLock {
    config: Arc<RwLock<Config>>,
}

impl ConfigLock {
    fn new(config: Arc<RwLock<Config>>) -> Self {
        Self { config }
    }

    pub fn lock_all(&self) -> Result<std::sync::RwLockReadGuard<'_, Config>, ConfigErr> {
        self.config.read().map_err(|_| ConfigErr::LockFailed)
    }
}

/// Max number of pending filesystem events from the config file
const FILE_MONITOR_EVENT_BUFFER: usize = 32;

/// Monitor service for watching the config file for changes
pub struct ConfigWatcher {
    /// Current config data
    pub config: ConfigLock,
    /// monitor task handle
    _monitor: JoinHandle<Result<()>>,
}

impl ConfigWatcher {
    /// Initialize a new config watcher and handle
    pub async fn new(config_path: &Path) -> Result<Self> {
        let initial_config = Config::load(config_path).await?;
        let config = Arc::new(RwLock::new(initial_config));
        let config_copy = config.clone();
        let config_path_copy = config_path.to_path_buf();

        let startup_notification = Arc::new(tokio::sync::Notify::new());
        let startup_notification_copy = startup_notification.clone();

        let monitor = tokio::spawn(async move {
            let (tx, mut rx) = tokio::sync::mpsc::channel(FILE_MONITOR_EVENT_BUFFER);

            let mut watcher = notify::recommended_watcher(move |res| match res {
                Ok(event) => {
                    if let Err(err) = tx.try_send(event) {
                        tracing::debug!("Failed to send filesystem event to channel: {err:?}");
                    }
                }
                Err(err) => tracing::error!("Failed to watch config file: {err:?}"),
            })
            .context("Failed to construct watcher")?;

            watcher
                .watch(&config_path_copy, notify::RecursiveMode::NonRecursive)
                .context("Failed to start watcher")?;
            startup_notification_copy.notify_one();

            while let Some(event) = rx.recv().await {
                match event.kind {
                    EventKind::Modify(_) => {
                        tracing::debug!("Reloading modified config file");
                        let new_config = match Config::load(&config_path_copy).await {
                            Ok(val) => val,
                            Err(err) => {
                                tracing::error!("Failed to load modified config: {err:?}");
                                continue;
                            }
                        };
                        let mut config = match config_copy.write() {
                            Ok(val) => val,
                            Err(err) => {
                                tracing::error!(
                                    "Failed to lock config, previously poisoned? {err:?}"
                                );
                                continue;
                            }
                        };
                        *config = new_config;
                    }
                    _ => {
                        tracing::debug!("unsupported config file event: {event:?}");
                    }
                }
            }

            watcher.unwatch(&config_path_copy).context("Failed to stop watching config")?;

            Ok(())
        });

        // Wait for successful start up, if failed return the Result
        if let Err(err) = timeout(Duration::from_secs(1), startup_notification.notified()).await {
            tracing::error!("Failed to get notification from config monitor startup in: {err}");
            let task_res = monitor.await.context("Config watcher startup failed")?;
            match task_res {
                Ok(_) => unreachable!("Startup failed to notify in timeout but exited cleanly"),
                Err(err) => return Err(err),
            }
        }
        tracing::debug!("Successful startup");

        Ok(Self { config: ConfigLock::new(config), _monitor: monitor })
    }
}
