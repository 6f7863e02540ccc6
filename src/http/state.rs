use crate::session::{InterviewSession, SessionConfig, SessionDeps};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active interview sessions (session_id → session)
    pub sessions: Arc<RwLock<HashMap<String, Arc<InterviewSession>>>>,

    /// Pacing configuration applied to every new session
    pub session_config: SessionConfig,

    /// Collaborators handed to every new session
    pub deps: SessionDeps,
}

impl AppState {
    pub fn new(session_config: SessionConfig, deps: SessionDeps) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            session_config,
            deps,
        }
    }
}
