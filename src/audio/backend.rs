use anyhow::Result;
use tokio::sync::mpsc;

use super::devices::DeviceError;

/// Capture stream kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureSource {
    /// Live monitor feed shown while a question is on screen
    Preview,
    /// Microphone input for answer recording
    Microphone,
}

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for capture backends
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate (will resample if needed)
    pub target_sample_rate: u32,
    /// Target channel count (1 = mono, 2 = stereo)
    pub target_channels: u16,
    /// Buffer size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16000, // 16kHz for speech
            target_channels: 1,        // Mono
            buffer_duration_ms: 100,   // 100ms buffers
        }
    }
}

/// Audio capture backend trait
///
/// Implementations:
/// - cpal: default input device (desktop platforms)
/// - scripted backends in tests
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Creates a capture backend for a given stream kind
///
/// The device manager only sees this seam; production wires in the cpal
/// factory, tests inject scripted devices.
pub trait CaptureBackendFactory: Send + Sync {
    fn create(
        &self,
        source: CaptureSource,
        config: &CaptureConfig,
    ) -> Result<Box<dyn CaptureBackend>, DeviceError>;
}
