//! HTTP API handlers
//!
//! Request handlers for stored sessions, the live session relay, and
//! binary previews.

mod live;
mod previews;
mod sessions;

use axum::response::{Html, IntoResponse, Json};

use ep_core::SessionStore;

use crate::error::{ApiError, HandlerError};
use crate::page::INDEX_HTML;

pub use live::{
    ImagesRequest, InboundRequest, LiveMessage, LiveView, SendRequest, clear_messages, inbound, live_state,
    new_live_session, remove_message, resume_session, send_script, set_images,
};
pub use previews::{PreviewQuery, preview};
pub use sessions::{delete_session, get_session, list_sessions, put_session};

/// Index page hosting the editor and the message relay
pub async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "ep-api"
    }))
}

/// Run a store operation on the blocking pool
async fn with_store<T, F>(store: &SessionStore, op: F) -> Result<T, HandlerError>
where
    F: FnOnce(&SessionStore) -> T + Send + 'static,
    T: Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| ApiError::Server(format!("Storage task failed: {}", e)).into())
}
