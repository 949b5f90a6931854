/// Error types for social-api
///
/// Every handler returns [`Result`]; failures are converted into a status code
/// and a short JSON body at the handler boundary.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use crypto_core::JwtError;
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing, malformed or expired bearer token
    #[error("{0}")]
    Authentication(String),

    /// Login failure; unknown email and wrong password are reported identically
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but not the owner
    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl AppError {
    fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Authentication(_) | AppError::InvalidCredentials => "AUTHENTICATION_ERROR",
            AppError::Authorization(_) => "AUTHORIZATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // Duplicate registrations answer 400, not 409.
            AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::InvalidCredentials = self {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "message": self.to_string()
            }));
        }

        let message = match self {
            AppError::Database(detail) | AppError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.error_type(),
            message,
        })
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            StoreError::DuplicateEmail => {
                AppError::Conflict("User with that email already exists".to_string())
            }
            StoreError::UnknownUser => {
                AppError::Authentication("Token subject no longer exists".to_string())
            }
            StoreError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken => AppError::Authentication("Invalid token".to_string()),
            JwtError::ExpiredToken => AppError::Authentication("Token expired".to_string()),
            JwtError::Encoding(msg) => AppError::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}
