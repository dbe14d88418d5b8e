//! Binary preview handler

use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::warn;

use crate::error::{ApiError, HandlerError};
use crate::server::AppState;

/// Query parameters for preview requests
#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    /// Serve as an attachment instead of inline
    #[serde(default)]
    pub download: bool,
}

/// Serve the bytes behind a preview handle
pub async fn preview(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Result<Response, HandlerError> {
    let resource = state
        .previews
        .get(&handle)
        .ok_or_else(|| ApiError::PreviewNotFound(handle.clone()))?;

    let mut response = (
        [(header::CONTENT_TYPE, resource.media_type.to_string())],
        resource.bytes.clone(),
    )
        .into_response();

    if query.download {
        let disposition = format!("attachment; filename=\"{}\"", resource.file_name(&handle));
        match HeaderValue::from_str(&disposition) {
            Ok(value) => {
                response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
            }
            Err(e) => warn!("Cannot set download name for {}: {}", handle, e),
        }
    }

    Ok(response)
}
