//! Stored session handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{debug, error, info};

use ep_core::{SessionRecord, SessionSummary};

use super::with_store;
use crate::error::{ApiError, HandlerError};
use crate::server::AppState;

/// List stored sessions, most recently updated first
pub async fn list_sessions(State(state): State<AppState>) -> Result<Json<Vec<SessionSummary>>, HandlerError> {
    let sessions = with_store(&state.store, |store| store.list_summaries()).await?;
    debug!("Listing {} sessions", sessions.len());
    Ok(Json(sessions))
}

/// Get a stored session
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionRecord>, HandlerError> {
    let lookup = id.clone();
    with_store(&state.store, move |store| store.get(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::SessionNotFound(id).into())
}

/// Create or overwrite a stored session
pub async fn put_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(record): Json<SessionRecord>,
) -> Result<Json<SessionRecord>, HandlerError> {
    if record.id != id {
        return Err(ApiError::InvalidRequest(format!("Body id {:?} does not match path id {:?}", record.id, id)).into());
    }

    match with_store(&state.store, move |store| store.put(&record)).await? {
        Ok(saved) => {
            info!("Stored session {} ({} messages)", saved.id, saved.messages.len());
            Ok(Json(saved))
        }
        Err(e) => {
            error!("Failed to store session {}: {}", id, e);
            Err(ApiError::from(e).into())
        }
    }
}

/// Delete a stored session
pub async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, HandlerError> {
    if let Some(autosave) = &state.autosave {
        autosave.cancel(&id);
    }

    let target = id.clone();
    if with_store(&state.store, move |store| store.delete(&target)).await? {
        info!("Deleted session {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(id).into())
    }
}
