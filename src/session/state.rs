use chrono::{DateTime, Utc};
use serde::Serialize;

/// The session's current step within one question's lifecycle
///
/// Exactly one phase is active at any instant; transitions follow the fixed
/// order Reading → RecordingArmed → Recording → Stopping → Uploading →
/// (Advancing | Finishing), with Finishing reachable from every phase via an
/// explicit finish request. Finished is the post-teardown resting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Reading,
    RecordingArmed,
    Recording,
    Stopping,
    Uploading,
    Advancing,
    Finishing,
    Finished,
}

/// Persistence status of the current question's answer
///
/// Reset to `Idle` whenever the cursor advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadOutcome {
    Idle,
    Uploading,
    Success,
    Error,
}

/// Read-only view of a running session
///
/// Updated only by the session driver's transition function; the HTTP layer
/// hands out clones.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,

    /// 0-based cursor into the question list
    pub question_index: usize,

    pub total_questions: usize,

    pub phase: Phase,

    /// Whole seconds left in the recording window, while one is open
    pub remaining_secs: Option<u32>,

    pub upload_outcome: UploadOutcome,

    pub started_at: DateTime<Utc>,

    pub finished: bool,
}
