//! Item list handlers.

use crate::api::AppState;
use crate::error::ApiError;
use crate::pagination::LoadOutcome;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// GET /items - Loaded items, cursor and loading flag
#[utoipa::path(
    get,
    path = "/api/v1/items",
    tag = "catalog",
    responses(
        (status = 200, description = "Pagination snapshot", body = crate::types::PaginationState)
    )
)]
pub async fn list_items(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.browser.snapshot().pagination)
}

/// POST /items/next - Load the next page
#[utoipa::path(
    post,
    path = "/api/v1/items/next",
    tag = "catalog",
    responses(
        (status = 200, description = "Page merged (possibly degraded to empty)", body = crate::pagination::PageReport),
        (status = 409, description = "A page load is already in flight", body = crate::error::ApiError)
    )
)]
pub async fn load_next_page(State(state): State<AppState>) -> Response {
    outcome_response(state.browser.load_next().await)
}

/// POST /items/refresh - Replace the list with a fresh first page
#[utoipa::path(
    post,
    path = "/api/v1/items/refresh",
    tag = "catalog",
    responses(
        (status = 200, description = "List replaced", body = crate::pagination::PageReport),
        (status = 409, description = "A page load is already in flight", body = crate::error::ApiError)
    )
)]
pub async fn refresh_items(State(state): State<AppState>) -> Response {
    outcome_response(state.browser.refresh().await)
}

fn outcome_response(outcome: LoadOutcome) -> Response {
    match outcome {
        LoadOutcome::Loaded(report) => (StatusCode::OK, Json(report)).into_response(),
        LoadOutcome::Busy => (
            StatusCode::CONFLICT,
            Json(ApiError::new(
                "load_in_progress",
                "a page load is already in flight",
            )),
        )
            .into_response(),
    }
}
