use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use tribu_accounts::{AccountError, ConflictField};
use tribu_core::validate::Violation;

/// Application-level errors that map directly to HTTP responses.
///
/// Every variant implements [`IntoResponse`] so Axum handlers can use
/// `Result<impl IntoResponse, AppError>` as their return type. Account-flow
/// outcomes convert via `From<AccountError>`; internal error text is logged,
/// never sent to the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<Violation>),

    #[error("{0} already taken")]
    Conflict(ConflictField),

    /// Covers both failed credential checks and missing authentication —
    /// deliberately a single generic message.
    #[error("unauthorized")]
    Unauthorized,

    #[error("current password incorrect")]
    WrongCurrentPassword,

    #[error("new passwords do not match")]
    PasswordMismatch,

    #[error("new password must not be empty")]
    EmptyPassword,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AccountError> for AppError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::Validation(violations) => AppError::Validation(violations),
            AccountError::Conflict(field) => AppError::Conflict(field),
            AccountError::AuthenticationFailed | AccountError::NotAuthenticated => {
                AppError::Unauthorized
            }
            AccountError::WrongCurrentPassword => AppError::WrongCurrentPassword,
            AccountError::PasswordMismatch => AppError::PasswordMismatch,
            AccountError::EmptyPassword => AppError::EmptyPassword,
            AccountError::Persistence(e) => AppError::Internal(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match &self {
            AppError::Validation(violations) => {
                let message = violations
                    .iter()
                    .map(|v| v.reason)
                    .collect::<Vec<_>>()
                    .join("; ");
                let field = violations.first().map(|v| v.field);
                (
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    message,
                    field,
                )
            }
            AppError::Conflict(conflict) => (
                StatusCode::CONFLICT,
                "uniqueness_conflict",
                format!("{conflict} already taken"),
                Some(conflict.as_str()),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Identifier or password incorrect".to_string(),
                None,
            ),
            AppError::WrongCurrentPassword => (
                StatusCode::BAD_REQUEST,
                "wrong_current_password",
                "Current password incorrect".to_string(),
                Some("current_password"),
            ),
            AppError::PasswordMismatch => (
                StatusCode::BAD_REQUEST,
                "password_mismatch",
                "New passwords do not match".to_string(),
                Some("new_password"),
            ),
            AppError::EmptyPassword => (
                StatusCode::BAD_REQUEST,
                "empty_password",
                "New password must not be empty".to_string(),
                Some("new_password"),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "field": field
                }
            })),
        )
            .into_response()
    }
}
