// HTTP handlers for authentication and profile endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest, User},
};
use crate::AppState;

/// Register a new user
/// POST /auth/register
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Invalid input data", body = crate::error::ErrorBody),
        (status = 500, description = "Email already registered or internal error", body = crate::error::ErrorBody)
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let response = state.auth_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login a user
/// POST /auth/login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid email or password", body = crate::error::ErrorBody)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = state.auth_service.login(request).await?;
    Ok(Json(response))
}

/// Get current user information
/// GET /auth/me
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me_handler(caller: AuthenticatedUser) -> Json<User> {
    Json(caller.user)
}

/// Update the caller's own profile
/// PUT /users/me
#[utoipa::path(
    put,
    path = "/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid input data", body = crate::error::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_profile_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Json(changes): Json<UpdateProfileRequest>,
) -> Result<Json<User>, AuthError> {
    let user = state
        .auth_service
        .update_profile(caller.id(), changes)
        .await?;
    Ok(Json(user))
}
