use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::backend::{AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource};

/// Errors raised while acquiring a camera/microphone stream
///
/// Acquisition failures degrade the affected feature; they are never
/// propagated past the session orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// No matching capture device is present
    NoDevice,
    /// The user or OS denied access to the device
    PermissionDenied,
    /// The backend failed to open or start the device
    Backend(String),
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceError::NoDevice => write!(f, "no capture device available"),
            DeviceError::PermissionDenied => write!(f, "capture device access denied"),
            DeviceError::Backend(msg) => write!(f, "capture backend error: {}", msg),
        }
    }
}

impl std::error::Error for DeviceError {}

/// A live capture stream bound to one question
///
/// Owns the backend that produces it. The frame receiver can be handed to a
/// recorder; releasing the stream stops the backend. Release is idempotent,
/// so every stream is torn down exactly once no matter which exit path the
/// session takes.
pub struct CaptureStream {
    source: CaptureSource,
    backend: Box<dyn CaptureBackend>,
    frames: Option<mpsc::Receiver<AudioFrame>>,
    released: bool,
}

impl CaptureStream {
    /// Take the frame receiver (once); the recorder consumes it
    pub fn take_frames(&mut self) -> Option<mpsc::Receiver<AudioFrame>> {
        self.frames.take()
    }

    pub fn source(&self) -> CaptureSource {
        self.source
    }

    /// Stop the underlying backend and mark the stream released
    pub async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.frames = None;

        if let Err(e) = self.backend.stop().await {
            warn!("Failed to stop {} backend: {}", self.backend.name(), e);
        }
    }
}

impl Drop for CaptureStream {
    fn drop(&mut self) {
        if !self.released {
            warn!(
                "{:?} stream dropped without release; backend {} may still be running",
                self.source,
                self.backend.name()
            );
        }
    }
}

/// Acquires and releases the streams a question needs
///
/// The preview feed and the recording microphone are independent streams
/// even when both target the same physical device; releasing one never
/// releases the other.
#[derive(Clone)]
pub struct CaptureDeviceManager {
    factory: Arc<dyn CaptureBackendFactory>,
    config: CaptureConfig,
}

impl CaptureDeviceManager {
    pub fn new(factory: Arc<dyn CaptureBackendFactory>, config: CaptureConfig) -> Self {
        Self { factory, config }
    }

    pub fn capture_config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Acquire the live preview stream for the current question
    pub async fn acquire_preview(&self) -> Result<CaptureStream, DeviceError> {
        self.acquire(CaptureSource::Preview).await
    }

    /// Acquire a fresh microphone stream for answer recording
    pub async fn acquire_microphone(&self) -> Result<CaptureStream, DeviceError> {
        self.acquire(CaptureSource::Microphone).await
    }

    async fn acquire(&self, source: CaptureSource) -> Result<CaptureStream, DeviceError> {
        let mut backend = self.factory.create(source, &self.config)?;

        let frames = backend
            .start()
            .await
            .map_err(|e| DeviceError::Backend(e.to_string()))?;

        info!("Acquired {:?} stream via {}", source, backend.name());

        Ok(CaptureStream {
            source,
            backend,
            frames: Some(frames),
            released: false,
        })
    }
}
