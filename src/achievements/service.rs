use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::achievements::{
    normalize_tags, Achievement, AchievementResponse, AchievementStatus, AchievementStore,
    CreateAchievementRequest, NewAchievement, OwnershipFilter, PendingAchievement, StatusMachine,
    UpdateAchievementRequest, Verification, VerifyAchievementRequest,
};
use crate::auth::{UserStore, UserSummary};
use crate::error::ApiError;

const RESOURCE: &str = "Achievement";

/// Service for achievement business logic
///
/// Every student-facing operation is scoped to the caller through an
/// [`OwnershipFilter`]; records belonging to anyone else behave as absent.
#[derive(Clone)]
pub struct AchievementService {
    achievements: Arc<dyn AchievementStore>,
    users: Arc<dyn UserStore>,
}

impl AchievementService {
    /// Create a new AchievementService
    pub fn new(achievements: Arc<dyn AchievementStore>, users: Arc<dyn UserStore>) -> Self {
        Self {
            achievements,
            users,
        }
    }

    /// Create an achievement owned by `owner_id`
    ///
    /// # Validation
    /// - Title must be 1-200 characters
    /// - Tags are trimmed and deduplicated
    /// - The record always starts pending with no verifier
    pub async fn create(
        &self,
        owner_id: Uuid,
        mut request: CreateAchievementRequest,
    ) -> Result<AchievementResponse, ApiError> {
        request.trim_fields();
        request.validate()?;

        let achievement = self
            .achievements
            .insert(NewAchievement {
                student_id: owner_id,
                title: request.title,
                category: request.category,
                description: request.description,
                date: request.date,
                issuing_authority: request.issuing_authority,
                proof_url: request.proof_url,
                tags: normalize_tags(request.tags),
            })
            .await?;

        tracing::info!(
            achievement_id = %achievement.id,
            student_id = %owner_id,
            "Created achievement"
        );
        Ok(AchievementResponse::new(achievement, None))
    }

    /// All of the caller's achievements, newest first, verifiers resolved
    pub async fn list_mine(&self, owner_id: Uuid) -> Result<Vec<AchievementResponse>, ApiError> {
        let achievements = self.achievements.find_by_owner(owner_id).await?;
        let verifier_ids: Vec<Uuid> = achievements.iter().filter_map(|a| a.verifier_id).collect();
        let verifiers = self.summaries_by_id(&verifier_ids).await?;

        Ok(achievements
            .into_iter()
            .map(|achievement| {
                let verifier = achievement
                    .verifier_id
                    .and_then(|id| verifiers.get(&id).cloned());
                AchievementResponse::new(achievement, verifier)
            })
            .collect())
    }

    pub async fn get_mine(
        &self,
        filter: OwnershipFilter,
    ) -> Result<AchievementResponse, ApiError> {
        let achievement = self
            .achievements
            .find_one(filter)
            .await?
            .ok_or(ApiError::not_found(RESOURCE))?;
        self.with_verifier(achievement).await
    }

    /// Merge `changes` into one of the caller's achievements
    pub async fn update_mine(
        &self,
        filter: OwnershipFilter,
        mut changes: UpdateAchievementRequest,
    ) -> Result<AchievementResponse, ApiError> {
        changes.trim_fields();
        changes.validate()?;
        changes.tags = changes.tags.map(normalize_tags);

        // TODO: authorization gap: owners can set status, verifier and remarks
        // here; restrict those fields to the verify endpoint once clients stop
        // relying on it.
        let achievement = self
            .achievements
            .update_one(filter, changes)
            .await?
            .ok_or(ApiError::not_found(RESOURCE))?;

        tracing::debug!(achievement_id = %achievement.id, "Updated achievement");
        self.with_verifier(achievement).await
    }

    pub async fn delete_mine(&self, filter: OwnershipFilter) -> Result<(), ApiError> {
        if !self.achievements.delete_one(filter).await? {
            return Err(ApiError::not_found(RESOURCE));
        }
        tracing::info!(achievement_id = %filter.id, "Removed achievement");
        Ok(())
    }

    /// Pending achievements across all students, oldest first
    pub async fn pending_queue(&self) -> Result<Vec<PendingAchievement>, ApiError> {
        let pending = self
            .achievements
            .find_by_status(AchievementStatus::Pending)
            .await?;
        let student_ids: Vec<Uuid> = pending.iter().map(|a| a.student_id).collect();
        let students = self.summaries_by_id(&student_ids).await?;

        Ok(pending
            .into_iter()
            .map(|achievement| {
                let student_info = students.get(&achievement.student_id).cloned();
                PendingAchievement {
                    achievement: AchievementResponse::new(achievement, None),
                    student_info,
                }
            })
            .collect())
    }

    /// Approve or reject a pending achievement on behalf of `verifier_id`
    ///
    /// The store only applies the outcome while the record is still pending,
    /// so two concurrent verifications cannot both succeed.
    pub async fn verify(
        &self,
        id: Uuid,
        verifier_id: Uuid,
        request: VerifyAchievementRequest,
    ) -> Result<AchievementResponse, ApiError> {
        request.validate()?;

        let current = self
            .achievements
            .find_by_id(id)
            .await?
            .ok_or(ApiError::not_found(RESOURCE))?;
        let status = StatusMachine::transition(current.status, request.status)
            .map_err(ApiError::InvalidTransition)?;

        let verified = self
            .achievements
            .apply_verification(
                id,
                Verification {
                    verifier_id,
                    status,
                    remarks: request.remarks,
                    verified_at: Utc::now(),
                },
            )
            .await?
            .ok_or_else(|| {
                ApiError::InvalidTransition(format!(
                    "Invalid status transition from {} to {}",
                    current.status, status
                ))
            })?;

        tracing::info!(
            achievement_id = %id,
            verifier_id = %verifier_id,
            status = %status,
            "Verified achievement"
        );
        self.with_verifier(verified).await
    }

    async fn with_verifier(&self, achievement: Achievement) -> Result<AchievementResponse, ApiError> {
        let verifier = match achievement.verifier_id {
            Some(verifier_id) => self
                .users
                .find_summaries(&[verifier_id])
                .await?
                .into_iter()
                .next(),
            None => None,
        };
        Ok(AchievementResponse::new(achievement, verifier))
    }

    async fn summaries_by_id(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, ApiError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut unique = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let summaries = self.users.find_summaries(&unique).await?;
        Ok(summaries
            .into_iter()
            .map(|summary| (summary.id, summary))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::{AchievementCategory, InMemoryAchievementStore};
    use crate::auth::models::NewUser;
    use crate::auth::{InMemoryUserStore, Role, User};

    struct Fixture {
        service: AchievementService,
        users: Arc<InMemoryUserStore>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserStore::new());
        let service = AchievementService::new(
            Arc::new(InMemoryAchievementStore::new()),
            users.clone(),
        );
        Fixture { service, users }
    }

    async fn seed_user(users: &InMemoryUserStore, email: &str, role: Role) -> User {
        users
            .insert(NewUser {
                name: email.split('@').next().unwrap_or("user").to_string(),
                email: email.to_string(),
                password_hash: "unused".to_string(),
                role,
            })
            .await
            .unwrap()
    }

    fn create_request(title: &str) -> CreateAchievementRequest {
        CreateAchievementRequest {
            title: title.to_string(),
            category: AchievementCategory::Competition,
            description: None,
            date: None,
            issuing_authority: None,
            proof_url: None,
            tags: vec![" hackathon ".to_string(), "hackathon".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_starts_pending_for_owner() {
        let fx = fixture();
        let student = seed_user(&fx.users, "asha@example.edu", Role::Student).await;

        let created = fx
            .service
            .create(student.id, create_request("X"))
            .await
            .unwrap();
        assert_eq!(created.student, student.id);
        assert_eq!(created.status, AchievementStatus::Pending);
        assert!(created.verifier.is_none());
        assert_eq!(created.tags, vec!["hackathon".to_string()]);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let fx = fixture();
        let result = fx.service.create(Uuid::new_v4(), create_request("")).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_whitespace_title_is_rejected() {
        let fx = fixture();
        let owner = seed_user(&fx.users, "a@example.edu", Role::Student).await;
        let result = fx.service.create(owner.id, create_request("   ")).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));

        let created = fx.service.create(owner.id, create_request("  X  ")).await.unwrap();
        assert_eq!(created.title, "X");
        let update = fx
            .service
            .update_mine(
                OwnershipFilter {
                    id: created.id,
                    owner_id: owner.id,
                },
                UpdateAchievementRequest {
                    title: Some(" \t ".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(update, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_other_owner_sees_not_found() {
        let fx = fixture();
        let owner = seed_user(&fx.users, "a@example.edu", Role::Student).await;
        let other = seed_user(&fx.users, "b@example.edu", Role::Admin).await;
        let created = fx.service.create(owner.id, create_request("X")).await.unwrap();

        let foreign = OwnershipFilter {
            id: created.id,
            owner_id: other.id,
        };
        assert!(matches!(
            fx.service.get_mine(foreign).await,
            Err(ApiError::NotFound { .. })
        ));
        assert!(matches!(
            fx.service
                .update_mine(foreign, UpdateAchievementRequest::default())
                .await,
            Err(ApiError::NotFound { .. })
        ));
        assert!(matches!(
            fx.service.delete_mine(foreign).await,
            Err(ApiError::NotFound { .. })
        ));

        let own = OwnershipFilter {
            id: created.id,
            owner_id: owner.id,
        };
        assert_eq!(fx.service.get_mine(own).await.unwrap().title, "X");
    }

    #[tokio::test]
    async fn test_update_can_set_status_and_verifier() {
        let fx = fixture();
        let owner = seed_user(&fx.users, "a@example.edu", Role::Student).await;
        let faculty = seed_user(&fx.users, "prof@example.edu", Role::Faculty).await;
        let created = fx.service.create(owner.id, create_request("X")).await.unwrap();

        let updated = fx
            .service
            .update_mine(
                OwnershipFilter {
                    id: created.id,
                    owner_id: owner.id,
                },
                UpdateAchievementRequest {
                    status: Some(AchievementStatus::Approved),
                    verifier: Some(faculty.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, AchievementStatus::Approved);
        assert_eq!(updated.verifier.map(|v| v.email), Some(faculty.email));
        assert_eq!(updated.title, "X");
    }

    #[tokio::test]
    async fn test_verify_once_then_refuse() {
        let fx = fixture();
        let owner = seed_user(&fx.users, "a@example.edu", Role::Student).await;
        let faculty = seed_user(&fx.users, "prof@example.edu", Role::Faculty).await;
        let created = fx.service.create(owner.id, create_request("X")).await.unwrap();

        let approved = fx
            .service
            .verify(
                created.id,
                faculty.id,
                VerifyAchievementRequest {
                    status: AchievementStatus::Approved,
                    remarks: Some("Certificate checked".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(approved.status, AchievementStatus::Approved);
        assert!(approved.verified_at.is_some());
        assert_eq!(approved.verifier.map(|v| v.id), Some(faculty.id));

        let again = fx
            .service
            .verify(
                created.id,
                faculty.id,
                VerifyAchievementRequest {
                    status: AchievementStatus::Rejected,
                    remarks: None,
                },
            )
            .await;
        assert!(matches!(again, Err(ApiError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_verify_unknown_record() {
        let fx = fixture();
        let result = fx
            .service
            .verify(
                Uuid::new_v4(),
                Uuid::new_v4(),
                VerifyAchievementRequest {
                    status: AchievementStatus::Approved,
                    remarks: None,
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_pending_queue_resolves_students() {
        let fx = fixture();
        let owner = seed_user(&fx.users, "a@example.edu", Role::Student).await;
        fx.service.create(owner.id, create_request("first")).await.unwrap();
        fx.service.create(owner.id, create_request("second")).await.unwrap();

        let queue = fx.service.pending_queue().await.unwrap();
        assert_eq!(queue.len(), 2);
        assert!(queue
            .iter()
            .all(|p| p.student_info.as_ref().map(|s| s.id) == Some(owner.id)));
    }
}
