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

use crate::{errors::CodedError, impl_coded_debug};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// One curated answer, keyed by the request's ancillary data.
///
/// The key is the full hex-encoded ancillary data rather than any
/// shortened form: two requests in a round can differ only deep inside
/// the ancillary payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "ancillaryData")]
    pub ancillary_data: String,
    pub answer: String,
    /// Deliberate abstention: the request stays unvoted.
    #[serde(default)]
    pub skip: bool,
    /// Re-commit even when a commit already exists on chain (used to
    /// replace a vote before the commit window closes).
    #[serde(default)]
    pub force: bool,
}

#[derive(Error)]
pub enum AnswerError {
    #[error("Answer file for round {0} is empty")]
    EmptyFile(u32),

    #[error("Answer entry {0} is missing ancillaryData or answer text")]
    InvalidEntry(usize),

    #[error("Failed to fetch answer file: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Answer file URL is invalid: {0}")]
    BadUrl(#[from] url::ParseError),
}

impl_coded_debug!(AnswerError);

impl CodedError for AnswerError {
    fn code(&self) -> &str {
        match self {
            AnswerError::EmptyFile(_) => "[V-ANS-1001]",
            AnswerError::InvalidEntry(_) => "[V-ANS-1002]",
            AnswerError::Http(_) => "[V-ANS-1003]",
            AnswerError::BadUrl(_) => "[V-ANS-1004]",
        }
    }
}

/// Where the per-round answers come from. The orchestrator never
/// derives answers itself.
#[async_trait]
pub trait AnswerSource {
    async fn fetch(&self, round_id: u32) -> Result<Vec<Answer>, AnswerError>;
}

/// Fetches `<base>/<round_id>.json` from the published answer repo.
pub struct GithubAnswerSource {
    client: reqwest::Client,
    base_url: String,
}

impl GithubAnswerSource {
    pub fn new(base_url: String) -> Self {
        Self { client: reqwest::Client::new(), base_url }
    }
}

#[async_trait]
impl AnswerSource for GithubAnswerSource {
    async fn fetch(&self, round_id: u32) -> Result<Vec<Answer>, AnswerError> {
        let url = Url::parse(&format!("{}/{round_id}.json", self.base_url.trim_end_matches('/')))?;
        tracing::debug!("Fetching answers from {url}");
        let answers: Vec<Answer> =
            self.client.get(url).send().await?.error_for_status()?.json().await?;
        validate_answers(round_id, &answers)?;
        Ok(answers)
    }
}

/// An answer file must be a non-empty array where every entry carries
/// both its key and its answer text. A malformed file fails the whole
/// round rather than voting on a partial view.
pub fn validate_answers(round_id: u32, answers: &[Answer]) -> Result<(), AnswerError> {
    if answers.is_empty() {
        return Err(AnswerError::EmptyFile(round_id));
    }
    for (idx, answer) in answers.iter().enumerate() {
        if answer.ancillary_data.is_empty() || answer.answer.is_empty() {
            return Err(AnswerError::InvalidEntry(idx));
        }
    }
    Ok(())
}
