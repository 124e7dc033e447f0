//! HTTP error type shared by all route handlers.
//!
//! Handlers return [`AppResult`]; every failure is rendered as a JSON body
//! `{"error": ..., "code": ...}` with a matching status code. Database and
//! internal failures are logged here and reported to clients generically.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

// ---

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Requested entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Request is well-formed but inconsistent (e.g. path/body id mismatch).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body failed range or length validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Request body is not the expected JSON shape.
    #[error("Invalid body: {0}")]
    InvalidBody(String),

    /// Query parameter missing, unparsable or outside its accepted range.
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    // ---
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) | AppError::InvalidBody(_) | AppError::InvalidParam(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Validation(_) | AppError::InvalidBody(_) | AppError::InvalidParam(_) => {
                "VALIDATION_ERROR"
            }
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // ---
        let message = match &self {
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                "A database error occurred".to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "Internal error");
                "An internal error occurred".to_string()
            }
            AppError::NotFound(entity) => format!("{entity} not found"),
            AppError::BadRequest(msg) | AppError::InvalidBody(msg) | AppError::InvalidParam(msg) => {
                msg.clone()
            }
            AppError::Validation(errors) => errors.to_string(),
        };

        let body = json!({
            "error": message,
            "code": self.code(),
        });

        (self.status(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        // ---
        match rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                AppError::InvalidBody(rejection.body_text())
            }
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidParam(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
