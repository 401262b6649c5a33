//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::code_generator::CodeGenerator;

/// Redirects a short code to its target.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Paths that cannot be a code (wrong length or charset) are answered with
/// 404 without touching the cache or the store.
///
/// # Errors
///
/// - 404 if no active link owns the code
/// - 410 if the link has expired
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    if !CodeGenerator::is_valid(&code) {
        return Err(AppError::not_found(
            "Short link not found",
            json!({ "code": code }),
        ));
    }

    let target = state.resolver.resolve(&code).await?;

    Ok(Redirect::temporary(&target))
}
