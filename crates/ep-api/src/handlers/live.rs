//! Live session handlers
//!
//! The browser page relays everything it sends to and receives from the
//! editor through these endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ep_core::session::LiveEntry;
use ep_core::{InboundPayload, LiveSession, MessageLogEntry, SessionMetadata};

use super::with_store;
use crate::error::{ApiError, HandlerError};
use crate::server::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Script to post to the editor
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub script: String,
}

/// Message event forwarded by the page
#[derive(Debug, Deserialize)]
pub struct InboundRequest {
    /// `event.origin` of the message
    pub origin: String,
    /// Tagged payload envelope
    pub payload: serde_json::Value,
}

/// Images to open in the editor
#[derive(Debug, Deserialize)]
pub struct ImagesRequest {
    pub urls: Vec<String>,
}

/// A log entry as shown on the page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMessage {
    #[serde(flatten)]
    pub entry: MessageLogEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

impl From<LiveEntry<'_>> for LiveMessage {
    fn from(live: LiveEntry<'_>) -> Self {
        Self {
            entry: live.entry.clone(),
            at: live.at,
            preview_url: live.preview.map(|handle| format!("/api/previews/{}", handle)),
        }
    }
}

/// The live session as shown on the page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveView {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub editor_url: String,
    pub image_urls: Vec<String>,
    pub messages: Vec<LiveMessage>,
}

impl LiveView {
    /// Sessions stored without an editor URL open `default_editor_url`
    pub fn new(live: &LiveSession, default_editor_url: &str) -> Self {
        let record = live.record();
        Self {
            id: record.id.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            editor_url: live.editor_url().unwrap_or(default_editor_url).to_string(),
            image_urls: record.metadata.as_ref().map(|m| m.image_urls.clone()).unwrap_or_default(),
            messages: live.entries().map(LiveMessage::from).collect(),
        }
    }
}

// ============================================================================
// Handler functions
// ============================================================================

/// Current live session
pub async fn live_state(State(state): State<AppState>) -> Json<LiveView> {
    let live = state.live.lock().await;
    Json(LiveView::new(&live, &state.config.editor.url))
}

/// Replace the live session with a fresh one
pub async fn new_live_session(State(state): State<AppState>) -> Json<LiveView> {
    let mut live = state.live.lock().await;
    live.release_previews(&state.previews);
    *live = LiveSession::new(state.config.editor.url.clone());
    state.schedule_save(&live);

    info!("Started live session {}", live.id());
    Json(LiveView::new(&live, &state.config.editor.url))
}

/// Replace the live session with a stored one
pub async fn resume_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LiveView>, HandlerError> {
    let lookup = id.clone();
    let record = with_store(&state.store, move |store| store.get(&lookup))
        .await?
        .ok_or(ApiError::SessionNotFound(id))?;

    let mut live = state.live.lock().await;
    live.release_previews(&state.previews);
    *live = LiveSession::resume(record);

    info!("Resumed session {} ({} messages)", live.id(), live.record().message_count());
    Ok(Json(LiveView::new(&live, &state.config.editor.url)))
}

/// Record a script the page is posting to the editor
pub async fn send_script(
    State(state): State<AppState>,
    Json(req): Json<SendRequest>,
) -> Result<Json<LiveMessage>, HandlerError> {
    if req.script.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Script is empty".to_string()).into());
    }

    let mut live = state.live.lock().await;
    let message = LiveMessage::from(live.record_sent(req.script));
    state.schedule_save(&live);

    debug!("Sent message {} in session {}", message.entry.id, live.id());
    Ok(Json(message))
}

/// Record a message event from the editor frame
pub async fn inbound(State(state): State<AppState>, Json(req): Json<InboundRequest>) -> Response {
    if !state.origin_filter.accepts(&req.origin) {
        return (StatusCode::ACCEPTED, Json(serde_json::json!({ "accepted": false }))).into_response();
    }

    let payload = InboundPayload::from_envelope(req.payload);
    let mut live = state.live.lock().await;
    let message = LiveMessage::from(live.record_received(payload, &state.previews));
    state.schedule_save(&live);

    debug!(
        "Received message {} ({}) in session {}",
        message.entry.id,
        message.entry.data_type,
        live.id()
    );
    Json(message).into_response()
}

/// Remove one entry from the live log
pub async fn remove_message(State(state): State<AppState>, Path(id): Path<u64>) -> Result<StatusCode, HandlerError> {
    let mut live = state.live.lock().await;
    if !live.remove_entry(id, &state.previews) {
        return Err(ApiError::MessageNotFound(id).into());
    }
    state.schedule_save(&live);
    Ok(StatusCode::NO_CONTENT)
}

/// Clear the live log
pub async fn clear_messages(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut live = state.live.lock().await;
    let removed = live.clear(&state.previews);
    state.schedule_save(&live);

    info!("Cleared {} messages from session {}", removed, live.id());
    Json(serde_json::json!({ "removed": removed }))
}

/// Set the images the editor opens with
pub async fn set_images(
    State(state): State<AppState>,
    Json(req): Json<ImagesRequest>,
) -> Result<Json<SessionMetadata>, HandlerError> {
    let mut live = state.live.lock().await;
    let metadata = live
        .set_images(req.urls, &state.config.editor.url)
        .map_err(ApiError::from)?
        .clone();
    state.schedule_save(&live);

    info!("Session {} now opens {} image(s)", live.id(), metadata.image_urls.len());
    Ok(Json(metadata))
}
