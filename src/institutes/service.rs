use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::auth::UserStore;
use crate::error::ApiError;
use crate::institutes::{
    CreateInstituteRequest, Institute, InstituteDetail, InstituteStore, UpdateInstituteRequest,
};

const RESOURCE: &str = "Institute";

/// Service for institute business logic
#[derive(Clone)]
pub struct InstituteService {
    institutes: Arc<dyn InstituteStore>,
    users: Arc<dyn UserStore>,
}

impl InstituteService {
    pub fn new(institutes: Arc<dyn InstituteStore>, users: Arc<dyn UserStore>) -> Self {
        Self { institutes, users }
    }

    pub async fn list(&self) -> Result<Vec<Institute>, ApiError> {
        Ok(self.institutes.list().await?)
    }

    /// One institute with its faculty and head resolved
    ///
    /// References to users that no longer exist are dropped from the result.
    pub async fn get(&self, id: Uuid) -> Result<InstituteDetail, ApiError> {
        let institute = self
            .institutes
            .find_by_id(id)
            .await?
            .ok_or(ApiError::not_found(RESOURCE))?;

        let mut ids = institute.faculty.clone();
        ids.extend(institute.head_id);
        let summaries = self.users.find_summaries(&ids).await?;

        let faculty = institute
            .faculty
            .iter()
            .filter_map(|id| summaries.iter().find(|s| s.id == *id).cloned())
            .collect();
        let head = institute
            .head_id
            .and_then(|id| summaries.iter().find(|s| s.id == id).cloned());
        Ok(InstituteDetail::new(institute, faculty, head))
    }

    /// Create an institute recorded as created by `caller_id`
    pub async fn create(
        &self,
        caller_id: Uuid,
        mut request: CreateInstituteRequest,
    ) -> Result<Institute, ApiError> {
        request.trim_fields();
        request.validate()?;
        let institute = self.institutes.insert(request.into_new(caller_id)).await?;
        tracing::info!(institute_id = %institute.id, code = %institute.code, "Created institute");
        Ok(institute)
    }

    pub async fn update(
        &self,
        id: Uuid,
        mut changes: UpdateInstituteRequest,
    ) -> Result<Institute, ApiError> {
        changes.trim_fields();
        changes.validate()?;

        let institute = self
            .institutes
            .update(id, changes)
            .await?
            .ok_or(ApiError::not_found(RESOURCE))?;
        tracing::info!(institute_id = %id, "Updated institute");
        Ok(institute)
    }

    pub async fn delete(&self, id: Uuid) -> Result<Institute, ApiError> {
        let removed = self
            .institutes
            .delete(id)
            .await?
            .ok_or(ApiError::not_found(RESOURCE))?;
        tracing::info!(institute_id = %id, "Removed institute");
        Ok(removed)
    }
}
