//! API route configuration.

use crate::api::handlers::{
    deactivate_link_handler, link_info_handler, link_stats_handler, shorten_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Versioned API routes, mounted under `/api/v1`.
///
/// # Endpoints
///
/// - `POST   /shorten`            - Create a short link
/// - `GET    /urls/{code}`        - Active link details
/// - `GET    /urls/{code}/stats`  - Click statistics (active or deactivated)
/// - `DELETE /urls/{code}`        - Deactivate a link
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route(
            "/urls/{code}",
            get(link_info_handler).delete(deactivate_link_handler),
        )
        .route("/urls/{code}/stats", get(link_stats_handler))
}
