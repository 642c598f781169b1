// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::error::ErrorBody;
use crate::store::StoreError;

/// Authentication and authorization error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Not authorized, no token")]
    MissingToken,

    #[error("Not authorized, token failed: {0}")]
    InvalidToken(String),

    #[error("Not authorized, token expired")]
    ExpiredToken,

    /// Token was valid but the identity it names no longer exists
    #[error("Not authorized, user not found")]
    UserNotFound,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Forbidden: requires one of the roles [{required}]")]
    Forbidden { required: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("A user with this email already exists")]
    EmailAlreadyExists,

    #[error("Password hashing error")]
    PasswordHashError,

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { field: "email" } => AuthError::EmailAlreadyExists,
            other => AuthError::Store(other),
        }
    }
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidToken(_)
            | AuthError::ExpiredToken
            | AuthError::UserNotFound
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthError::ValidationError(_) => StatusCode::BAD_REQUEST,
            // Unique violations have no dedicated status yet and surface as server errors
            AuthError::EmailAlreadyExists
            | AuthError::PasswordHashError
            | AuthError::TokenGenerationError(_)
            | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to send to clients
    pub fn error_message(&self) -> String {
        match self {
            AuthError::PasswordHashError
            | AuthError::TokenGenerationError(_)
            | AuthError::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::MissingToken
            | AuthError::InvalidToken(_)
            | AuthError::ExpiredToken
            | AuthError::UserNotFound => warn!("Rejected unauthenticated request: {}", self),
            AuthError::InvalidCredentials => warn!("Failed login attempt"),
            AuthError::Forbidden { .. } => warn!("Forbidden access attempt: {}", self),
            AuthError::EmailAlreadyExists => warn!("Registration with an existing email"),
            AuthError::PasswordHashError
            | AuthError::TokenGenerationError(_)
            | AuthError::Store(_) => error!("Auth internal error: {:?}", self),
            AuthError::ValidationError(_) => {}
        }

        let status = self.status_code();
        let body = ErrorBody::new(self.error_message());
        (status, Json(body)).into_response()
    }
}
