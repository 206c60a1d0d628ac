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

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::runner::{WalletClass, WalletResult};

/// Receives each wallet's final bucket for the round. Buckets are
/// disjoint: a wallet lands in exactly one per run.
#[async_trait]
pub trait OutcomeSink: Send + Sync {
    async fn record(&self, result: &WalletResult) -> Result<()>;
}

fn bucket_name(class: WalletClass) -> &'static str {
    match class {
        WalletClass::Successful => "successful",
        WalletClass::Skipped => "skipped",
        WalletClass::Failed => "failed",
    }
}

/// Writes one marker file per wallet under
/// `<root>/{successful,skipped,failed}/<delegate>`, containing the
/// transaction hash when there is one.
pub struct FileOutcomeSink {
    root: PathBuf,
}

impl FileOutcomeSink {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl OutcomeSink for FileOutcomeSink {
    async fn record(&self, result: &WalletResult) -> Result<()> {
        let dir = self.root.join(bucket_name(result.class));
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create outcome dir: {}", dir.display()))?;

        let path = dir.join(result.delegate.to_string());
        let body = result.transaction_hash.map(|tx| tx.to_string()).unwrap_or_default();
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("Failed to write outcome file: {}", path.display()))?;
        Ok(())
    }
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct MemorySink {
    pub records: std::sync::Mutex<Vec<WalletResult>>,
}

#[async_trait]
impl OutcomeSink for MemorySink {
    async fn record(&self, result: &WalletResult) -> Result<()> {
        self.records.lock().map_err(|_| anyhow::anyhow!("sink poisoned"))?.push(result.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256};

    #[tokio::test]
    async fn file_sink_writes_bucket_markers() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileOutcomeSink::new(dir.path().to_path_buf());

        let delegate = Address::from([0x11u8; 20]);
        let tx = B256::from([0xaau8; 32]);
        sink.record(&WalletResult {
            delegate,
            class: WalletClass::Successful,
            transaction_hash: Some(tx),
        })
        .await
        .unwrap();
        sink.record(&WalletResult {
            delegate: Address::from([0x22u8; 20]),
            class: WalletClass::Failed,
            transaction_hash: None,
        })
        .await
        .unwrap();

        let success = dir.path().join("successful").join(delegate.to_string());
        assert_eq!(std::fs::read_to_string(success).unwrap(), tx.to_string());

        let failed =
            dir.path().join("failed").join(Address::from([0x22u8; 20]).to_string());
        assert_eq!(std::fs::read_to_string(failed).unwrap(), "");
        assert!(!dir.path().join("skipped").exists());
    }

    #[tokio::test]
    async fn memory_sink_collects() {
        let sink = MemorySink::default();
        sink.record(&WalletResult {
            delegate: Address::ZERO,
            class: WalletClass::Skipped,
            transaction_hash: None,
        })
        .await
        .unwrap();
        assert_eq!(sink.records.lock().unwrap().len(), 1);
    }
}
