pub mod audio;
pub mod config;
pub mod http;
pub mod session;
pub mod speech;
pub mod timer;
pub mod upload;

pub use audio::{
    AnswerArtifact, AnswerRecorder, AudioFrame, CaptureBackend, CaptureBackendFactory,
    CaptureConfig, CaptureDeviceManager, CaptureSource, CaptureStream, DeviceError,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use session::{
    InterviewPlan, InterviewSession, Phase, Question, SessionConfig, SessionDeps, SessionSnapshot,
    UploadOutcome,
};
pub use speech::{SpeechPlayback, SpokenQuestionReader, TtsClient};
pub use timer::{CountdownHandle, CountdownTimer, TimerEvent};
pub use upload::{AnswerUploader, BackendClient};
