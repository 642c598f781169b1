// Error handling for the resource handlers
// Provides the handler error type and the `{message}` response envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Body of every failure response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    /// Field-level validation errors, omitted when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }
}

/// Main error type for the resource handlers
///
/// Each variant maps to a specific HTTP status code. Database and internal
/// errors are logged in full and answered with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Failures from the auth gate or role guard
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Request validation failed. Maps to 400
    #[error("Request validation failed")]
    Validation(#[from] validator::ValidationErrors),

    /// Record absent, or owned by someone other than the caller. Maps to 404
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    /// Status change not allowed by the achievement state machine. Maps to 400
    #[error("{0}")]
    InvalidTransition(String),

    /// Unique constraint violation. No dedicated status yet; maps to 500
    #[error("A record with this {field} already exists")]
    Conflict { field: &'static str },

    /// Database operation errors. Maps to 500
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Internal server errors. Maps to 500
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(resource: &'static str) -> Self {
        ApiError::NotFound { resource }
    }

    /// Parse a path id; anything that is not a UUID names no record
    pub fn parse_id(raw: &str, resource: &'static str) -> Result<Uuid, Self> {
        Uuid::parse_str(raw).map_err(|_| ApiError::not_found(resource))
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => err.status_code(),
            ApiError::Validation(_) | ApiError::InvalidTransition(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } | ApiError::Database(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { field } => ApiError::Conflict { field },
            StoreError::Database(db_error) => ApiError::Database(db_error),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::Auth(err) => return err.into_response(),
            ApiError::Validation(ref errors) => {
                debug!("Validation error: {:?}", errors);
                ErrorBody {
                    message: self.to_string(),
                    details: serde_json::to_value(errors).ok(),
                }
            }
            ApiError::NotFound { .. } | ApiError::InvalidTransition(_) => {
                debug!("{}", self);
                ErrorBody::new(self.to_string())
            }
            ApiError::Conflict { .. } => {
                warn!("Conflict error: {}", self);
                ErrorBody::new(self.to_string())
            }
            ApiError::Database(ref db_error) => {
                error!("Database error: {:?}", db_error);
                ErrorBody::new("A database error occurred")
            }
            ApiError::Internal(ref internal_msg) => {
                error!("Internal error: {}", internal_msg);
                ErrorBody::new("An internal server error occurred")
            }
        };

        (status, Json(body)).into_response()
    }
}
