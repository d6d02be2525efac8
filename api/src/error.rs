use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{auth::token::TokenError, response::ApiResponse};

pub const MSG_VALIDATION: &str = "Validation error";
pub const MSG_DUPLICATE: &str = "Email already exists";
pub const MSG_INVALID_CREDENTIAL: &str = "Invalid email or password";
pub const MSG_TOKEN_REQUIRED: &str = "Authorization token is required";
pub const MSG_INVALID_TOKEN: &str = "Invalid or malformed token";
pub const MSG_TOKEN_EXPIRED: &str = "Token has expired";
pub const MSG_NOTE_NOT_FOUND: &str = "Note not found";
pub const MSG_FORBIDDEN: &str = "You are not authorized to access this note";
pub const MSG_NOT_FOUND: &str = "Resource not found";
pub const MSG_PAYLOAD_TOO_LARGE: &str = "Request body is too large";
pub const MSG_SERVER_ERROR: &str = "Internal server error";

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },
    #[error("email already registered")]
    Duplicate,
    #[error("invalid credentials")]
    InvalidCredential,
    #[error("missing bearer token")]
    TokenMissing,
    #[error("malformed or unverifiable token")]
    TokenMalformed,
    #[error("token expired")]
    TokenExpired,
    #[error("token subject no longer exists")]
    IdentityNotFound,
    #[error("note not found")]
    ResourceNotFound,
    #[error("note belongs to another user")]
    Forbidden,
    #[error("route not found")]
    RouteNotFound,
    #[error("request body over the size limit")]
    PayloadTooLarge,
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        let message = errors
            .first()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| MSG_VALIDATION.to_string());
        AppError::Validation { message, errors }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        AppError::Internal(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Duplicate => StatusCode::CONFLICT,
            AppError::InvalidCredential
            | AppError::TokenMissing
            | AppError::TokenMalformed
            | AppError::TokenExpired
            | AppError::IdentityNotFound => StatusCode::UNAUTHORIZED,
            AppError::ResourceNotFound | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. A vanished token subject reads the same as a bad token.
    pub fn message(&self) -> String {
        match self {
            AppError::Validation { message, .. } => message.clone(),
            AppError::Duplicate => MSG_DUPLICATE.into(),
            AppError::InvalidCredential => MSG_INVALID_CREDENTIAL.into(),
            AppError::TokenMissing => MSG_TOKEN_REQUIRED.into(),
            AppError::TokenMalformed | AppError::IdentityNotFound => MSG_INVALID_TOKEN.into(),
            AppError::TokenExpired => MSG_TOKEN_EXPIRED.into(),
            AppError::ResourceNotFound => MSG_NOTE_NOT_FOUND.into(),
            AppError::Forbidden => MSG_FORBIDDEN.into(),
            AppError::RouteNotFound => MSG_NOT_FOUND.into(),
            AppError::PayloadTooLarge => MSG_PAYLOAD_TOO_LARGE.into(),
            AppError::Internal(_) => MSG_SERVER_ERROR.into(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(inner: sqlx::Error) -> Self {
        // Check for unique constraint violation
        if let Some(db_err) = inner.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::Duplicate;
            }
        }
        AppError::Internal(format!("database: {inner}"))
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(inner: argon2::password_hash::Error) -> Self {
        AppError::Internal(format!("password hashing: {inner}"))
    }
}

impl From<argon2::Error> for AppError {
    fn from(inner: argon2::Error) -> Self {
        AppError::Internal(format!("argon2 parameters: {inner}"))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(inner: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("token signing: {inner}"))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(inner: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task: {inner}"))
    }
}

impl From<TokenError> for AppError {
    fn from(inner: TokenError) -> Self {
        match inner {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Malformed | TokenError::BadSignature => AppError::TokenMalformed,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::validation(vec![FieldError {
            field: "body",
            message: rejection.body_text(),
        }])
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation(vec![FieldError {
            field: "query",
            message: rejection.body_text(),
        }])
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::validation(vec![FieldError {
            field: "path",
            message: rejection.body_text(),
        }])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let data = match &self {
            AppError::Internal(detail) => {
                tracing::error!("{}", detail);
                None
            }
            AppError::Validation { errors, .. } => Some(json!({ "errors": errors })),
            other => {
                tracing::debug!(status = status.as_u16(), "request rejected: {}", other);
                None
            }
        };

        ApiResponse::<serde_json::Value>::failure(self.message(), data).with_status(status)
    }
}
