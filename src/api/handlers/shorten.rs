//! Handler for link shortening endpoint.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::application::services::ShortenCommand;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_normalizer::normalize_url;

/// Creates a short link for a URL.
///
/// # Endpoint
///
/// `POST /api/v1/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/docs",
///   "custom_alias": "docs2025",
///   "expiry_days": 30
/// }
/// ```
///
/// `custom_alias` and `expiry_days` are optional. Shortening a URL that
/// already has a live link returns that link.
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "short_code": "docs2025",
///   "short_url": "https://sho.rt/docs2025",
///   "original_url": "https://example.com/docs",
///   "created_at": "2025-03-01T12:00:00Z",
///   "expires_at": "2025-03-31T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 if the body fails validation or the URL is not http(s)
/// - 409 if the alias is taken or no free code could be generated
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let target = normalize_url(&payload.url).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    let shortened = state
        .link_service
        .shorten(ShortenCommand {
            target,
            custom_code: payload.custom_alias,
            expiry_days: payload.expiry_days,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(shortened.into())))
}
