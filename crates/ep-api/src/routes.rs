//! Route definitions
//!
//! Defines all HTTP API endpoints.

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::handlers::{
    clear_messages, delete_session, get_session, health, index, inbound, list_sessions, live_state,
    new_live_session, preview, put_session, remove_message, resume_session, send_script, set_images,
};
use crate::server::AppState;

/// Create the API router
pub fn routes() -> Router<AppState> {
    Router::new()
        // Page and health check
        .route("/", get(index))
        .route("/health", get(health))
        // Stored sessions
        .route("/api/sessions", get(list_sessions))
        .route(
            "/api/sessions/{id}",
            get(get_session).put(put_session).delete(delete_session),
        )
        // Live session relay
        .route("/api/live", get(live_state))
        .route("/api/live/new", post(new_live_session))
        .route("/api/live/resume/{id}", post(resume_session))
        .route("/api/live/send", post(send_script))
        .route("/api/live/inbound", post(inbound))
        .route("/api/live/messages", delete(clear_messages))
        .route("/api/live/messages/{id}", delete(remove_message))
        .route("/api/live/images", post(set_images))
        // Binary previews
        .route("/api/previews/{handle}", get(preview))
}
