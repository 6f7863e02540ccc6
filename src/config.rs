use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::audio::CaptureConfig;
use crate::session::SessionConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub backend: BackendConfig,
    pub speech: SpeechConfig,
    pub audio: AudioConfig,
    pub session: SessionPacingConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Interview backend this service uploads answers to
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

/// Text-to-speech engine settings
#[derive(Debug, Deserialize)]
pub struct SpeechConfig {
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub model: String,
    pub voice: String,
    pub speed: f32,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioConfig {
    pub fn to_capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            target_sample_rate: self.sample_rate,
            target_channels: self.channels,
            ..CaptureConfig::default()
        }
    }
}

/// Session pacing knobs
#[derive(Debug, Deserialize)]
pub struct SessionPacingConfig {
    pub settle_delay_ms: u64,
    pub reading_cap_secs: u64,
}

impl SessionPacingConfig {
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            reading_cap: Duration::from_secs(self.reading_cap_secs),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
