use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/interviews/start", post(handlers::start_interview))
        .route(
            "/interviews/:session_id/advance",
            post(handlers::advance_interview),
        )
        .route(
            "/interviews/:session_id/finish",
            post(handlers::finish_interview),
        )
        // Session queries
        .route(
            "/interviews/:session_id/status",
            get(handlers::get_interview_status),
        )
        // Browser front end lives on another origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
