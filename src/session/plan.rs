use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Recording window applied when a question carries no usable estimate
pub const DEFAULT_RECORDING_BUDGET_SECS: u32 = 90;

/// One interview question, supplied by the intake flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Backend identifier for this question
    pub id: String,

    /// The text read aloud to the candidate
    pub text: String,

    /// Suggested answer length in seconds; bounds the recording window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_seconds: Option<u32>,
}

impl Question {
    /// Recording budget: the estimate when present and positive, else 90
    pub fn recording_budget_secs(&self) -> u32 {
        self.estimated_seconds
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_RECORDING_BUDGET_SECS)
    }
}

/// A complete interview: identifier shared with the backend plus the
/// ordered question list
///
/// Created by the external intake flow; the session owns it read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewPlan {
    pub session_id: String,
    pub questions: Vec<Question>,
}

/// Tunables for session pacing
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Pause between a question's upload outcome and the next question,
    /// so the candidate sees the outcome indicator before the view changes
    pub settle_delay: Duration,

    /// Hard upper bound on the Reading phase; past it the question
    /// proceeds to recording even if playback never signalled completion
    pub reading_cap: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(1000),
            reading_cap: Duration::from_secs(120),
        }
    }
}
