//! Download slot handlers.

use super::{DownloadAccepted, DownloadRequest};
use crate::api::AppState;
use crate::error::Error;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// GET /download - Download slot state
#[utoipa::path(
    get,
    path = "/api/v1/download",
    tag = "download",
    responses(
        (status = 200, description = "Download state", body = crate::types::DownloadState)
    )
)]
pub async fn get_download(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.browser.snapshot().download)
}

/// POST /download - Start downloading an item
///
/// Runs in the background; follow `/events` or poll `GET /download` for the
/// outcome.
#[utoipa::path(
    post,
    path = "/api/v1/download",
    tag = "download",
    request_body(content = DownloadRequest, description = "Item to download (defaults to the selection)"),
    responses(
        (status = 202, description = "Download started", body = DownloadAccepted),
        (status = 404, description = "Item not loaded, or nothing selected", body = crate::error::ApiError),
        (status = 409, description = "Another download is in progress", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn start_download(
    State(state): State<AppState>,
    body: Option<Json<DownloadRequest>>,
) -> Response {
    let request = body.map(|Json(request)| request).unwrap_or_default();

    let item = match request.id {
        Some(id) => state.browser.find_item(id),
        None => state
            .browser
            .selected()
            .ok_or_else(|| Error::NotFound("no item is selected".to_string())),
    };
    let item = match item {
        Ok(item) => item,
        Err(e) => return e.into_response(),
    };

    let item_id = item.id;
    match state.browser.spawn_download(item) {
        Ok(_handle) => (StatusCode::ACCEPTED, Json(DownloadAccepted { item_id })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// DELETE /download - Cancel the active download
#[utoipa::path(
    delete,
    path = "/api/v1/download",
    tag = "download",
    responses(
        (status = 204, description = "Cancellation requested"),
        (status = 409, description = "No download in progress", body = crate::error::ApiError)
    )
)]
pub async fn cancel_download(State(state): State<AppState>) -> Response {
    match state.browser.cancel_download() {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
