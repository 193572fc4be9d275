//! # Janseva Web
//!
//! Axum integration for the queue engine: HTTP handlers for every
//! engine operation, identity extractors, error mapping, and WebSocket
//! change-signal endpoints.
//!
//! The transport is deliberately thin - every route body is a parse,
//! one engine call, and a serialize. Authorization semantics (ownership,
//! office affiliation) live in the engine, not here.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Routes:
/// - Health checks (no authentication)
/// - Citizen token endpoints under `/api/tokens`
/// - Official queue endpoints under `/api/offices/:id`
/// - WebSocket signal endpoints under `/api/ws`
#[must_use]
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Citizen surface
        .route("/tokens", post(handlers::tokens::book_token))
        .route("/tokens", get(handlers::tokens::my_tokens))
        .route("/tokens/:id/cancel", post(handlers::tokens::cancel_token))
        // Official surface
        .route("/offices/:id/queue", get(handlers::queue::get_queue))
        .route("/offices/:id/call-next", post(handlers::queue::call_next))
        .route("/tokens/:id/status", post(handlers::queue::set_status))
        .route("/offices/:id/stats", get(handlers::queue::today_stats))
        // Change signals
        .route("/ws/queue/:office_id", get(handlers::ws::office_queue_socket))
        .route("/ws/my-tokens", get(handlers::ws::my_tokens_socket));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
