use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::trim_option;
use crate::auth::UserSummary;

/// Kind of activity an achievement records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Conference,
    Workshop,
    Certification,
    Club,
    Volunteering,
    Internship,
    Competition,
    Leadership,
}

/// Verification state of an achievement
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AchievementStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl AchievementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementStatus::Pending => "pending",
            AchievementStatus::Approved => "approved",
            AchievementStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for AchievementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Achievement record as stored
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Achievement {
    pub id: Uuid,
    pub student_id: Uuid,
    pub title: String,
    pub category: AchievementCategory,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub issuing_authority: Option<String>,
    pub proof_url: Option<String>,
    pub status: AchievementStatus,
    pub verifier_id: Option<Uuid>,
    pub remarks: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Query predicate matching one record by id and owner together
///
/// Passed whole to the store so the ownership check is part of the lookup
/// itself; a record owned by someone else is simply not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipFilter {
    pub id: Uuid,
    pub owner_id: Uuid,
}

/// Values needed to insert an achievement; status always starts at pending
#[derive(Debug, Clone)]
pub struct NewAchievement {
    pub student_id: Uuid,
    pub title: String,
    pub category: AchievementCategory,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub issuing_authority: Option<String>,
    pub proof_url: Option<String>,
    pub tags: Vec<String>,
}

/// Outcome recorded by a verifier
#[derive(Debug, Clone)]
pub struct Verification {
    pub verifier_id: Uuid,
    pub status: AchievementStatus,
    pub remarks: Option<String>,
    pub verified_at: DateTime<Utc>,
}

/// Request DTO for creating an achievement
///
/// Owner, status and verifier are not part of it; unknown fields such as
/// `status` or `student` in the body are ignored.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAchievementRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    #[schema(example = "Smart India Hackathon finalist")]
    pub title: String,
    pub category: AchievementCategory,
    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub issuing_authority: Option<String>,
    pub proof_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateAchievementRequest {
    /// Trim the title so a whitespace-only one fails validation
    pub fn trim_fields(&mut self) {
        self.title = self.title.trim().to_string();
    }
}

/// Request DTO for a partial achievement update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAchievementRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    pub category: Option<AchievementCategory>,
    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub issuing_authority: Option<String>,
    pub proof_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<AchievementStatus>,
    pub verifier: Option<Uuid>,
    pub remarks: Option<String>,
}

impl UpdateAchievementRequest {
    pub fn trim_fields(&mut self) {
        trim_option(&mut self.title);
    }
}

/// Request DTO for the verification action
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VerifyAchievementRequest {
    pub status: AchievementStatus,
    #[validate(length(max = 2000, message = "Remarks must not exceed 2000 characters"))]
    pub remarks: Option<String>,
}

/// Response DTO with the verifier resolved to display fields
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AchievementResponse {
    pub id: Uuid,
    pub student: Uuid,
    pub title: String,
    pub category: AchievementCategory,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub issuing_authority: Option<String>,
    pub proof_url: Option<String>,
    pub status: AchievementStatus,
    pub verifier: Option<UserSummary>,
    pub remarks: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl AchievementResponse {
    pub fn new(achievement: Achievement, verifier: Option<UserSummary>) -> Self {
        Self {
            id: achievement.id,
            student: achievement.student_id,
            title: achievement.title,
            category: achievement.category,
            description: achievement.description,
            date: achievement.date,
            issuing_authority: achievement.issuing_authority,
            proof_url: achievement.proof_url,
            status: achievement.status,
            verifier,
            remarks: achievement.remarks,
            tags: achievement.tags,
            created_at: achievement.created_at,
            verified_at: achievement.verified_at,
        }
    }
}

/// Pending achievement with its owner resolved, for the verification queue
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingAchievement {
    #[serde(flatten)]
    pub achievement: AchievementResponse,
    pub student_info: Option<UserSummary>,
}

/// Trim tags, drop empty ones and remove duplicates keeping first occurrence
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if !trimmed.is_empty() && !normalized.iter().any(|existing| existing == trimmed) {
            normalized.push(trimmed.to_string());
        }
    }
    normalized
}
