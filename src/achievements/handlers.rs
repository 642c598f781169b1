// HTTP handlers for achievement endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::achievements::{
    AchievementResponse, CreateAchievementRequest, OwnershipFilter, PendingAchievement,
    UpdateAchievementRequest, VerifyAchievementRequest,
};
use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::AppState;

const RESOURCE: &str = "Achievement";

/// Plain acknowledgement body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn owned_by(caller: &AuthenticatedUser, raw_id: &str) -> Result<OwnershipFilter, ApiError> {
    Ok(OwnershipFilter {
        id: ApiError::parse_id(raw_id, RESOURCE)?,
        owner_id: caller.id(),
    })
}

/// Handler for POST /achievements
/// Creates an achievement owned by the caller
#[utoipa::path(
    post,
    path = "/achievements",
    request_body = CreateAchievementRequest,
    responses(
        (status = 201, description = "Achievement created", body = AchievementResponse),
        (status = 400, description = "Invalid input data", body = crate::error::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "achievements"
)]
pub async fn create_achievement_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Json(request): Json<CreateAchievementRequest>,
) -> Result<(StatusCode, Json<AchievementResponse>), ApiError> {
    let achievement = state
        .achievement_service
        .create(caller.id(), request)
        .await?;
    Ok((StatusCode::CREATED, Json(achievement)))
}

/// Handler for GET /achievements
#[utoipa::path(
    get,
    path = "/achievements",
    responses(
        (status = 200, description = "Caller's achievements, newest first", body = [AchievementResponse]),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "achievements"
)]
pub async fn list_achievements_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<Vec<AchievementResponse>>, ApiError> {
    let achievements = state.achievement_service.list_mine(caller.id()).await?;
    Ok(Json(achievements))
}

/// Handler for GET /achievements/pending
/// Verification queue (faculty/admin only)
#[utoipa::path(
    get,
    path = "/achievements/pending",
    responses(
        (status = 200, description = "Pending achievements, oldest first", body = [PendingAchievement]),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not faculty or admin", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "achievements"
)]
pub async fn pending_achievements_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<Vec<PendingAchievement>>, ApiError> {
    caller.require_any_role(&[Role::Faculty, Role::Admin])?;
    let queue = state.achievement_service.pending_queue().await?;
    Ok(Json(queue))
}

/// Handler for GET /achievements/{id}
#[utoipa::path(
    get,
    path = "/achievements/{id}",
    params(("id" = String, Path, description = "Achievement id")),
    responses(
        (status = 200, description = "Achievement", body = AchievementResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 404, description = "Absent or owned by someone else", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "achievements"
)]
pub async fn get_achievement_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<AchievementResponse>, ApiError> {
    let filter = owned_by(&caller, &id)?;
    let achievement = state.achievement_service.get_mine(filter).await?;
    Ok(Json(achievement))
}

/// Handler for PUT /achievements/{id}
#[utoipa::path(
    put,
    path = "/achievements/{id}",
    params(("id" = String, Path, description = "Achievement id")),
    request_body = UpdateAchievementRequest,
    responses(
        (status = 200, description = "Achievement updated", body = AchievementResponse),
        (status = 400, description = "Invalid input data", body = crate::error::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 404, description = "Absent or owned by someone else", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "achievements"
)]
pub async fn update_achievement_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
    Json(changes): Json<UpdateAchievementRequest>,
) -> Result<Json<AchievementResponse>, ApiError> {
    let filter = owned_by(&caller, &id)?;
    let achievement = state.achievement_service.update_mine(filter, changes).await?;
    Ok(Json(achievement))
}

/// Handler for DELETE /achievements/{id}
#[utoipa::path(
    delete,
    path = "/achievements/{id}",
    params(("id" = String, Path, description = "Achievement id")),
    responses(
        (status = 200, description = "Achievement removed", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 404, description = "Absent or owned by someone else", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "achievements"
)]
pub async fn delete_achievement_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let filter = owned_by(&caller, &id)?;
    state.achievement_service.delete_mine(filter).await?;
    Ok(Json(MessageResponse {
        message: "Achievement removed".to_string(),
    }))
}

/// Handler for PATCH /achievements/{id}/verify
/// Approves or rejects a pending achievement (faculty/admin only)
#[utoipa::path(
    patch,
    path = "/achievements/{id}/verify",
    params(("id" = String, Path, description = "Achievement id")),
    request_body = VerifyAchievementRequest,
    responses(
        (status = 200, description = "Verification recorded", body = AchievementResponse),
        (status = 400, description = "Record is not pending", body = crate::error::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not faculty or admin", body = crate::error::ErrorBody),
        (status = 404, description = "Achievement not found", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "achievements"
)]
pub async fn verify_achievement_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
    Json(request): Json<VerifyAchievementRequest>,
) -> Result<Json<AchievementResponse>, ApiError> {
    caller.require_any_role(&[Role::Faculty, Role::Admin])?;
    let id = ApiError::parse_id(&id, RESOURCE)?;
    let achievement = state
        .achievement_service
        .verify(id, caller.id(), request)
        .await?;
    Ok(Json(achievement))
}
