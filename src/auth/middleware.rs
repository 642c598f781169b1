// Auth gate for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    models::{Role, User},
};
use crate::AppState;

/// Caller identity resolved from the bearer token
///
/// Extracting this type verifies the token, then reloads the user from the
/// credential store so deleted accounts are rejected even while their tokens
/// are still unexpired. Handlers taking it never run for unauthenticated calls.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Fail with `Forbidden` unless the caller holds one of `allowed`
    pub fn require_any_role(&self, allowed: &[Role]) -> Result<(), AuthError> {
        if allowed.contains(&self.role()) {
            return Ok(());
        }
        let required = allowed
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        warn!(
            "Authorization failed: user_id={}, role={}, required=[{}]",
            self.id(), self.role(), required
        );
        Err(AuthError::Forbidden { required })
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header
///
/// Anything other than a bearer credential counts as no token at all.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MissingToken)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let endpoint = parts.uri.path();

        let token = bearer_token(&parts.headers).map_err(|err| {
            debug!("No bearer token on request to {}", endpoint);
            err
        })?;

        let claims = state.tokens.verify(token)?;

        let user = state
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| {
                warn!("Token for unknown user {} on {}", claims.sub, endpoint);
                AuthError::UserNotFound
            })?;

        debug!(
            "Authenticated user_id={}, role={}, endpoint={}",
            user.id, user.role, endpoint
        );
        Ok(AuthenticatedUser { user })
    }
}
