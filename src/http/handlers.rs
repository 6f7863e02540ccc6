use super::state::AppState;
use crate::session::{InterviewPlan, InterviewSession, Question, SessionSnapshot};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    /// Optional session ID from the intake flow (if not provided, generate UUID)
    pub session_id: Option<String>,

    /// Ordered question list for the whole interview
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub session_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct FinishInterviewResponse {
    pub session_id: String,
    pub status: String,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /interviews/start
/// Create a new interview session and begin reading the first question
pub async fn start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> impl IntoResponse {
    // Generate or use provided session ID
    let session_id = req
        .session_id
        .unwrap_or_else(|| format!("interview-{}", uuid::Uuid::new_v4()));

    info!(
        "Starting interview session: {} ({} questions)",
        session_id,
        req.questions.len()
    );

    // Check if already running
    {
        let sessions = state.sessions.read().await;
        if sessions.contains_key(&session_id) {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Interview {} is already running", session_id),
                }),
            )
                .into_response();
        }
    }

    let plan = InterviewPlan {
        session_id: session_id.clone(),
        questions: req.questions,
    };

    let session = InterviewSession::start(plan, state.session_config.clone(), state.deps.clone());

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(session_id.clone(), session);
    }

    info!("Interview session started: {}", session_id);

    (
        StatusCode::OK,
        Json(StartInterviewResponse {
            session_id: session_id.clone(),
            status: "started".to_string(),
            message: format!("Interview started for session {}", session_id),
        }),
    )
        .into_response()
}

/// POST /interviews/:session_id/advance
/// Request a jump to the next question (inert while a question is read aloud)
pub async fn advance_interview(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => {
            session.advance().await;
            (
                StatusCode::OK,
                Json(AdvanceResponse {
                    session_id: session_id.clone(),
                    status: "advance-requested".to_string(),
                }),
            )
                .into_response()
        }
        None => {
            error!("Interview {} not found", session_id);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Interview {} not found", session_id),
                }),
            )
                .into_response()
        }
    }
}

/// POST /interviews/:session_id/finish
/// End the interview from whatever state it is in; responds after teardown
pub async fn finish_interview(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    info!("Finishing interview session: {}", session_id);

    // Remove the session so the id can be reused once it is done
    let session = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&session_id)
    };

    match session {
        Some(session) => {
            session.finish().await;
            session.finished().await;

            let snapshot = session.snapshot().await;

            info!("Interview session finished: {}", session_id);
            (
                StatusCode::OK,
                Json(FinishInterviewResponse {
                    session_id: session_id.clone(),
                    status: "finished".to_string(),
                    snapshot,
                }),
            )
                .into_response()
        }
        None => {
            error!("Interview {} not found", session_id);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Interview {} not found", session_id),
                }),
            )
                .into_response()
        }
    }
}

/// GET /interviews/:session_id/status
/// Read-only snapshot of a session (phase, cursor, countdown, outcome)
pub async fn get_interview_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => {
            let snapshot = session.snapshot().await;
            (StatusCode::OK, Json(snapshot)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Interview {} not found", session_id),
            }),
        )
            .into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
