//! HTTP API for the embedding front end
//!
//! This module provides the control surface of a running interview:
//! - POST /interviews/start - Create and start a session
//! - POST /interviews/:id/advance - Request the next question
//! - POST /interviews/:id/finish - End the interview
//! - GET /interviews/:id/status - Read-only session snapshot
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
