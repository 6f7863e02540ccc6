use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::debug;

/// Sample rate of raw PCM returned by the speech endpoint
pub const TTS_SAMPLE_RATE: u32 = 24000;

/// Client for an OpenAI-compatible `/v1/audio/speech` endpoint
///
/// Requests raw 24kHz mono s16le PCM so the sink can play it without a
/// decode step.
pub struct TtsClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    voice: String,
    speed: f32,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
    response_format: &'a str,
}

impl TtsClient {
    pub fn new(endpoint: String, api_key: String, model: String, voice: String, speed: f32) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            model,
            voice,
            speed,
        }
    }

    /// Synthesize the question text into PCM samples
    pub async fn synthesize(&self, text: &str) -> Result<Vec<i16>> {
        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
            response_format: "pcm",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .context("Speech synthesis request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Speech synthesis error {}: {}", status, body);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read synthesis response body")?;

        // s16le PCM
        let samples: Vec<i16> = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        debug!(
            "Synthesized {} samples ({:.1}s) for {} chars",
            samples.len(),
            samples.len() as f64 / f64::from(TTS_SAMPLE_RATE),
            text.len()
        );

        Ok(samples)
    }
}
