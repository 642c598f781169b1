// Authentication service - business logic layer

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{AuthResponse, LoginRequest, NewUser, RegisterRequest, UpdateProfileRequest, User},
    password::PasswordService,
    repository::UserStore,
    token::TokenService,
};

/// Authentication service coordinating registration, login and profile updates
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Register a new user and issue a token
    ///
    /// The email uniqueness check is left to the store so concurrent
    /// registrations cannot both succeed.
    pub async fn register(&self, mut request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        request.trim_fields();
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        PasswordService::validate_password_strength(&request.password)?;

        let password_hash = PasswordService::hash_password(&request.password)?;
        let user = self
            .users
            .insert(NewUser {
                name: request.name,
                email: request.email,
                password_hash,
                role: request.role,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Registered new user");
        let token = self.tokens.issue(user.id, &user.email, user.role)?;
        Ok(AuthResponse { token, user })
    }

    /// Login a user
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;

        let credentials = self
            .users
            .find_credentials_by_email(request.email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !PasswordService::verify_password(&request.password, &credentials.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .users
            .find_by_id(credentials.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        tracing::debug!(user_id = %user.id, "User logged in");
        let token = self.tokens.issue(user.id, &user.email, user.role)?;
        Ok(AuthResponse { token, user })
    }

    /// Merge profile fields for the caller
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        mut changes: UpdateProfileRequest,
    ) -> Result<User, AuthError> {
        changes.trim_fields();
        changes
            .validate()
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;

        self.users
            .update_profile(user_id, changes)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
