// HTTP handlers for institute endpoints
//
// Reads are public. Writes pass the auth gate but no role check.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::institutes::{
    CreateInstituteRequest, Envelope, Institute, InstituteDetail, UpdateInstituteRequest,
};
use crate::AppState;

const RESOURCE: &str = "Institute";

/// Handler for GET /institutes
#[utoipa::path(
    get,
    path = "/institutes",
    responses(
        (status = 200, description = "All institutes ordered by name", body = crate::institutes::InstituteListEnvelope)
    ),
    tag = "institutes"
)]
pub async fn list_institutes_handler(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<Institute>>>, ApiError> {
    let institutes = state.institute_service.list().await?;
    Ok(Json(Envelope::ok(institutes)))
}

/// Handler for GET /institutes/{id}
#[utoipa::path(
    get,
    path = "/institutes/{id}",
    params(("id" = String, Path, description = "Institute id")),
    responses(
        (status = 200, description = "Institute with faculty and head resolved", body = crate::institutes::InstituteDetailEnvelope),
        (status = 404, description = "Institute not found", body = crate::error::ErrorBody)
    ),
    tag = "institutes"
)]
pub async fn get_institute_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<InstituteDetail>>, ApiError> {
    let id = ApiError::parse_id(&id, RESOURCE)?;
    let institute = state.institute_service.get(id).await?;
    Ok(Json(Envelope::ok(institute)))
}

/// Handler for POST /institutes
#[utoipa::path(
    post,
    path = "/institutes",
    request_body = CreateInstituteRequest,
    responses(
        (status = 201, description = "Institute created", body = crate::institutes::InstituteEnvelope),
        (status = 400, description = "Invalid input data", body = crate::error::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 500, description = "Duplicate code or internal error", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "institutes"
)]
pub async fn create_institute_handler(
    State(state): State<AppState>,
    // TODO: authorization gap: any authenticated user can create institutes;
    // creators are meant to hold the gov role.
    caller: AuthenticatedUser,
    Json(request): Json<CreateInstituteRequest>,
) -> Result<(StatusCode, Json<Envelope<Institute>>), ApiError> {
    let institute = state
        .institute_service
        .create(caller.id(), request)
        .await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(institute))))
}

/// Handler for PUT /institutes/{id}
#[utoipa::path(
    put,
    path = "/institutes/{id}",
    params(("id" = String, Path, description = "Institute id")),
    request_body = UpdateInstituteRequest,
    responses(
        (status = 200, description = "Institute updated", body = crate::institutes::InstituteEnvelope),
        (status = 400, description = "Invalid input data", body = crate::error::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 404, description = "Institute not found", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "institutes"
)]
pub async fn update_institute_handler(
    State(state): State<AppState>,
    // TODO: authorization gap: no role check on institute writes
    _caller: AuthenticatedUser,
    Path(id): Path<String>,
    Json(changes): Json<UpdateInstituteRequest>,
) -> Result<Json<Envelope<Institute>>, ApiError> {
    let id = ApiError::parse_id(&id, RESOURCE)?;
    let institute = state.institute_service.update(id, changes).await?;
    Ok(Json(Envelope::ok(institute)))
}

/// Handler for DELETE /institutes/{id}
/// Responds with the removed record
#[utoipa::path(
    delete,
    path = "/institutes/{id}",
    params(("id" = String, Path, description = "Institute id")),
    responses(
        (status = 200, description = "Institute removed", body = crate::institutes::InstituteEnvelope),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 404, description = "Institute not found", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "institutes"
)]
pub async fn delete_institute_handler(
    State(state): State<AppState>,
    // TODO: authorization gap: no role check on institute writes
    _caller: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Institute>>, ApiError> {
    let id = ApiError::parse_id(&id, RESOURCE)?;
    let removed = state.institute_service.delete(id).await?;
    Ok(Json(Envelope::ok(removed)))
}
