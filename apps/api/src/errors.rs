use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ApiResponse;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant maps to the `{success: false, message, data: null}` envelope
/// the clients expect. Unexpected failures are logged server-side and returned
/// with a generic message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Verification code is invalid")]
    InvalidCode,

    #[error("Verification code is invalid or expired")]
    Expired,

    #[error("Account is already verified")]
    AlreadyVerified,

    #[error("Account is not verified")]
    Unverified,

    #[error("Too many attempts, request a new code")]
    TooManyAttempts,

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AppError::InvalidCode => (
                StatusCode::BAD_REQUEST,
                "Verification code is invalid".to_string(),
            ),
            AppError::Expired => (
                StatusCode::BAD_REQUEST,
                "Verification code is invalid or expired".to_string(),
            ),
            AppError::AlreadyVerified => (
                StatusCode::BAD_REQUEST,
                "Account is already verified".to_string(),
            ),
            AppError::Unverified => (
                StatusCode::FORBIDDEN,
                "Account is not verified".to_string(),
            ),
            AppError::TooManyAttempts => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many attempts, request a new code".to_string(),
            ),
            AppError::Delivery(msg) => {
                tracing::error!("Email delivery failed: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "Failed to deliver the verification email".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::<()>::failure(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unverified_and_invalid_credentials_use_distinct_statuses() {
        let unverified = AppError::Unverified.into_response();
        let wrong_password = AppError::InvalidCredentials.into_response();
        assert_eq!(unverified.status(), StatusCode::FORBIDDEN);
        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn database_errors_do_not_leak_detail() {
        let resp = AppError::Database(sqlx::Error::PoolClosed).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
