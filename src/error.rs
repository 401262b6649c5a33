//! Application error type and its HTTP rendering.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Partial unique index that allows one active row per code.
pub const ACTIVE_CODE_CONSTRAINT: &str = "short_links_active_code_key";

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload returned to API clients.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Errors surfaced by services and repositories.
///
/// `CodeTaken` and `GenerationExhausted` are both conflicts: one because a
/// caller asked for an occupied alias, the other because every generated
/// candidate was occupied.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("Short link '{code}' has expired")]
    Expired { code: String },

    #[error("Short code '{code}' is already taken")]
    CodeTaken { code: String },

    #[error("Failed to generate a unique short code after {attempts} attempts")]
    GenerationExhausted { attempts: usize },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Returns true for the conflict kind (occupied alias or exhausted generation).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::CodeTaken { .. } | Self::GenerationExhausted { .. }
        )
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            Self::Expired { .. } => (StatusCode::GONE, "expired"),
            Self::CodeTaken { .. } | Self::GenerationExhausted { .. } => {
                (StatusCode::CONFLICT, "conflict")
            }
            Self::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Converts the error into the serializable payload used in responses.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (_, code) = self.status_and_code();
        let details = match self {
            Self::Validation { details, .. }
            | Self::NotFound { details, .. }
            | Self::Internal { details, .. } => details.clone(),
            Self::Expired { code } | Self::CodeTaken { code } => json!({ "code": code }),
            Self::GenerationExhausted { attempts } => json!({ "attempts": attempts }),
        };

        ErrorInfo {
            code,
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, _) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Request validation failed", details)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", e);
        AppError::internal("Database error", json!({}))
    }
}

/// Maps an insert failure, turning a clash on the active-code index into
/// [`AppError::CodeTaken`].
pub fn map_insert_error(e: sqlx::Error, code: &str) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
        && db.constraint() == Some(ACTIVE_CODE_CONSTRAINT)
    {
        return AppError::CodeTaken {
            code: code.to_string(),
        };
    }

    AppError::from(e)
}
