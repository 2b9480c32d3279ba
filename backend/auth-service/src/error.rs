/// Error types for the auth service
///
/// Every failure in the auth core is terminal for the current request and
/// maps to exactly one HTTP status through `ResponseError`.
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use crypto_core::jwt::TokenError;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;
pub type Result<T> = AuthResult<T>;

/// JSON body of every error response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
    pub success: bool,
}

impl AuthError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AuthError::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AuthError::Unauthorized(msg.into())
    }

    /// Message safe to hand to clients
    fn public_message(&self) -> String {
        match self {
            AuthError::Internal(_) => "Something went wrong".to_string(),
            AuthError::Database(_) => "Something went wrong while accessing storage".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::Internal(_) | AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        HttpResponse::build(status).json(ErrorBody {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.public_message(),
            success: false,
        })
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => {
                AuthError::Conflict("User with email or username already exists".to_string())
            }
            StoreError::Backend(msg) => AuthError::Database(msg),
        }
    }
}

/// Signing failures are misconfiguration; verification failures are the caller's fault
impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::Unauthorized("Token expired".to_string()),
            TokenError::Invalid(_) => AuthError::Unauthorized("Invalid token".to_string()),
            TokenError::Signing(msg) | TokenError::Config(msg) => AuthError::Internal(msg),
        }
    }
}
