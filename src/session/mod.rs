//! Interview session orchestration
//!
//! This module provides the `InterviewSession` state machine that manages:
//! - Spoken question playback and its completion boundary
//! - Per-question preview and microphone stream lifetimes
//! - The countdown-bounded recording window
//! - Answer upload hand-off and session analysis trigger
//! - Read-only session snapshots for the HTTP layer

mod plan;
mod session;
mod state;

pub use plan::{InterviewPlan, Question, SessionConfig, DEFAULT_RECORDING_BUDGET_SECS};
pub use session::{InterviewSession, SessionDeps};
pub use state::{Phase, SessionSnapshot, UploadOutcome};
