//! Application error type and its mapping onto the `{code, message, data}` envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::DbErr;
use thiserror::Error;

use crate::api::response::ApiResponse;

/// Reserved application codes carried in the response body.
pub mod codes {
    pub const SUCCESS: i32 = 200;
    pub const PARAM_ERROR: i32 = 400;
    pub const UNAUTHORIZED: i32 = 401;
    pub const FORBIDDEN: i32 = 403;
    pub const NOT_FOUND: i32 = 404;
    pub const SYSTEM_ERROR: i32 = 500;
    pub const USER_NOT_FOUND: i32 = 4001;
    pub const PASSWORD_ERROR: i32 = 4002;
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("unauthorized, please log in")]
    Unauthorized,

    #[error("insufficient permissions")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("user does not exist")]
    UserNotFound,

    #[error("wrong password")]
    PasswordError,

    #[error("username already exists")]
    DuplicateUsername,

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Application code placed in the envelope.
    pub fn code(&self) -> i32 {
        match self {
            AppError::Validation(_) => codes::PARAM_ERROR,
            AppError::Unauthorized => codes::UNAUTHORIZED,
            AppError::Forbidden => codes::FORBIDDEN,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::UserNotFound => codes::USER_NOT_FOUND,
            AppError::PasswordError => codes::PASSWORD_ERROR,
            AppError::DuplicateUsername
            | AppError::Conflict(_)
            | AppError::Database(_)
            | AppError::Hash(_)
            | AppError::Internal(_) => codes::SYSTEM_ERROR,
        }
    }

    /// HTTP status. Business failures travel with 200 and a reserved body code.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UserNotFound
            | AppError::PasswordError
            | AppError::DuplicateUsername
            | AppError::Conflict(_) => StatusCode::OK,
            AppError::Database(_) | AppError::Hash(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message exposed to the caller; internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Hash(_) | AppError::Internal(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(_) | AppError::Hash(_) | AppError::Internal(_) => {
                tracing::error!(error = ?self, "request failed");
            }
            _ => {
                tracing::debug!(code = self.code(), error = %self, "request rejected");
            }
        }

        let body = ApiResponse::<()>::error(self.code(), self.public_message());
        (self.status(), Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
