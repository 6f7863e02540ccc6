pub mod backend;
pub mod cpal_backend;
pub mod devices;
pub mod recorder;

pub use backend::{AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource};
pub use cpal_backend::{CpalBackend, CpalCaptureFactory};
pub use devices::{CaptureDeviceManager, CaptureStream, DeviceError};
pub use recorder::{AnswerArtifact, AnswerRecorder, MAX_RECORDING_SECS};
