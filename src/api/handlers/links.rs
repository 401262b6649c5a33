//! Handlers for link lookup and deactivation.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::dto::link::LinkInfoResponse;
use crate::domain::entities::LinkStats;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the active link for a code.
///
/// `GET /api/v1/urls/{code}`
pub async fn link_info_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LinkInfoResponse>, AppError> {
    let link = state.link_service.get_info(&code).await?;
    let short_url = state.link_service.short_url(&link.code);

    Ok(Json(LinkInfoResponse::new(link, short_url)))
}

/// Returns click statistics for a code, including deactivated links.
///
/// `GET /api/v1/urls/{code}/stats`
pub async fn link_stats_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LinkStats>, AppError> {
    Ok(Json(state.link_service.get_stats(&code).await?))
}

/// Deactivates a link. The row is kept for statistics.
///
/// `DELETE /api/v1/urls/{code}` returns `204 No Content`.
pub async fn deactivate_link_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    state.link_service.deactivate(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}
