//! Selection handlers.

use super::SelectRequest;
use crate::api::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// GET /selection - Detail-viewed item
#[utoipa::path(
    get,
    path = "/api/v1/selection",
    tag = "selection",
    responses(
        (status = 200, description = "Selected item, or null when nothing is selected", body = crate::types::CatalogItem)
    )
)]
pub async fn get_selection(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.browser.selected())
}

/// PUT /selection - Select a loaded item
#[utoipa::path(
    put,
    path = "/api/v1/selection",
    tag = "selection",
    request_body = SelectRequest,
    responses(
        (status = 200, description = "Item selected", body = crate::types::CatalogItem),
        (status = 404, description = "No loaded item has that id", body = crate::error::ApiError)
    )
)]
pub async fn select_item(
    State(state): State<AppState>,
    Json(request): Json<SelectRequest>,
) -> Response {
    match state.browser.select_by_id(request.id) {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// DELETE /selection - Dismiss the detail view
#[utoipa::path(
    delete,
    path = "/api/v1/selection",
    tag = "selection",
    responses(
        (status = 204, description = "Selection cleared")
    )
)]
pub async fn clear_selection(State(state): State<AppState>) -> impl IntoResponse {
    state.browser.clear_selection();
    StatusCode::NO_CONTENT
}
