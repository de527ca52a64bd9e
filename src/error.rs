use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::validation::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Validation failed ({} field errors)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log the error at a level matching its cause.
    fn log(&self) {
        match self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Internal(e) => tracing::error!("Internal error: {:?}", e),
            AppError::Jwt(e) => tracing::warn!("JWT error: {:?}", e),
            AppError::Validation(errors) => tracing::debug!("Validation failed: {:?}", errors),
            _ => {}
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let (code, message, details) = match &self {
            AppError::Unauthorized => ("UNAUTHORIZED", self.to_string(), None),
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone(), None),
            AppError::BadRequest(msg) => ("BAD_REQUEST", msg.clone(), None),
            AppError::RateLimited => ("RATE_LIMITED", self.to_string(), None),
            AppError::Validation(errors) => (
                "VALIDATION_ERROR",
                "Validation failed".to_string(),
                serde_json::to_value(errors).ok(),
            ),
            AppError::Database(_) => (
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
                None,
            ),
            AppError::Jwt(_) => ("INVALID_TOKEN", "Invalid or expired token".to_string(), None),
            AppError::Internal(_) => (
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Failure of a form action. Whatever the cause, the client only ever sees
/// `{ "error": true }`; the status code and the log line carry the rest.
#[derive(Debug)]
pub struct ActionError(pub AppError);

#[derive(Serialize)]
struct ActionErrorBody {
    error: bool,
}

impl From<AppError> for ActionError {
    fn from(error: AppError) -> Self {
        ActionError(error)
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        self.0.log();
        (self.0.status_code(), Json(ActionErrorBody { error: true })).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

pub type ActionResult<T> = Result<T, ActionError>;
