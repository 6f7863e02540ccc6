use anyhow::{bail, Context, Result};
use reqwest::multipart;
use std::time::Duration;
use tracing::{info, warn};

use crate::audio::AnswerArtifact;
use crate::session::UploadOutcome;

/// Persists finished answers and triggers whole-session analysis
///
/// `upload` always resolves to `Success` or `Error`; network failure and
/// non-2xx status are reported uniformly, never retried, and never block
/// session progression.
#[async_trait::async_trait]
pub trait AnswerUploader: Send + Sync {
    async fn upload(
        &self,
        session_id: &str,
        question_id: &str,
        artifact: &AnswerArtifact,
    ) -> UploadOutcome;

    /// Ask the backend to analyze the whole session; issued once at finish
    async fn request_analysis(&self, session_id: &str) -> Result<()>;
}

/// HTTP client for the interview backend
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: String, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_answer(
        &self,
        session_id: &str,
        question_id: &str,
        artifact: &AnswerArtifact,
    ) -> Result<()> {
        let url = format!(
            "{}/api/upload-answer/{}/{}",
            self.base_url, session_id, question_id
        );

        let part = multipart::Part::bytes(artifact.wav.clone())
            .file_name("answer.wav")
            .mime_str("audio/wav")
            .context("Failed to build audio part")?;

        let form = multipart::Form::new().part("audio", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("Upload request failed")?;

        if !response.status().is_success() {
            bail!("Upload rejected with status {}", response.status());
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl AnswerUploader for BackendClient {
    async fn upload(
        &self,
        session_id: &str,
        question_id: &str,
        artifact: &AnswerArtifact,
    ) -> UploadOutcome {
        match self.post_answer(session_id, question_id, artifact).await {
            Ok(()) => {
                info!(
                    "Answer uploaded: session={} question={} ({} bytes)",
                    session_id,
                    question_id,
                    artifact.wav.len()
                );
                UploadOutcome::Success
            }
            Err(e) => {
                warn!(
                    "Answer upload failed: session={} question={}: {:#}",
                    session_id, question_id, e
                );
                UploadOutcome::Error
            }
        }
    }

    async fn request_analysis(&self, session_id: &str) -> Result<()> {
        let url = format!("{}/api/analyze/{}", self.base_url, session_id);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .context("Analysis request failed")?;

        if !response.status().is_success() {
            bail!("Analysis rejected with status {}", response.status());
        }

        info!("Session analysis requested: {}", session_id);
        Ok(())
    }
}
