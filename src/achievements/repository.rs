use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::achievements::{
    Achievement, AchievementStatus, NewAchievement, OwnershipFilter, UpdateAchievementRequest,
    Verification,
};
use crate::store::StoreError;

const ACHIEVEMENT_COLUMNS: &str = "id, student_id, title, category, description, date, \
    issuing_authority, proof_url, status, verifier_id, remarks, tags, created_at, verified_at";

/// Persistence port for achievement records
///
/// Owner-scoped operations take an [`OwnershipFilter`] and never return or
/// touch a record whose owner differs from `filter.owner_id`.
#[async_trait]
pub trait AchievementStore: Send + Sync {
    /// Insert a new record with status pending and no verifier
    async fn insert(&self, achievement: NewAchievement) -> Result<Achievement, StoreError>;

    /// All records owned by `owner_id`, newest first
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Achievement>, StoreError>;

    async fn find_one(&self, filter: OwnershipFilter) -> Result<Option<Achievement>, StoreError>;

    /// Merge `changes` into the record matching `filter`
    async fn update_one(
        &self,
        filter: OwnershipFilter,
        changes: UpdateAchievementRequest,
    ) -> Result<Option<Achievement>, StoreError>;

    /// Remove the record matching `filter`; false when nothing matched
    async fn delete_one(&self, filter: OwnershipFilter) -> Result<bool, StoreError>;

    /// Unscoped lookup, for verifiers only
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Achievement>, StoreError>;

    /// All records in `status`, oldest first
    async fn find_by_status(&self, status: AchievementStatus)
        -> Result<Vec<Achievement>, StoreError>;

    async fn count_by_status(&self, status: AchievementStatus) -> Result<i64, StoreError>;

    /// Record a verification outcome, only while the record is still pending
    async fn apply_verification(
        &self,
        id: Uuid,
        verification: Verification,
    ) -> Result<Option<Achievement>, StoreError>;
}

/// PostgreSQL-backed achievement repository
#[derive(Clone)]
pub struct PgAchievementRepository {
    pool: PgPool,
}

impl PgAchievementRepository {
    /// Create a new PgAchievementRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AchievementStore for PgAchievementRepository {
    async fn insert(&self, achievement: NewAchievement) -> Result<Achievement, StoreError> {
        let query = format!(
            r#"
            INSERT INTO achievements
                (id, student_id, title, category, description, date, issuing_authority,
                 proof_url, status, tags, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ACHIEVEMENT_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Achievement>(&query)
            .bind(Uuid::new_v4())
            .bind(achievement.student_id)
            .bind(&achievement.title)
            .bind(achievement.category)
            .bind(&achievement.description)
            .bind(achievement.date)
            .bind(&achievement.issuing_authority)
            .bind(&achievement.proof_url)
            .bind(AchievementStatus::Pending)
            .bind(&achievement.tags)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Achievement>, StoreError> {
        let query = format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements \
             WHERE student_id = $1 ORDER BY created_at DESC"
        );
        let achievements = sqlx::query_as::<_, Achievement>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(achievements)
    }

    async fn find_one(&self, filter: OwnershipFilter) -> Result<Option<Achievement>, StoreError> {
        let query = format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE id = $1 AND student_id = $2"
        );
        let achievement = sqlx::query_as::<_, Achievement>(&query)
            .bind(filter.id)
            .bind(filter.owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(achievement)
    }

    async fn update_one(
        &self,
        filter: OwnershipFilter,
        changes: UpdateAchievementRequest,
    ) -> Result<Option<Achievement>, StoreError> {
        let query = format!(
            r#"
            UPDATE achievements
            SET title = COALESCE($3, title),
                category = COALESCE($4, category),
                description = COALESCE($5, description),
                date = COALESCE($6, date),
                issuing_authority = COALESCE($7, issuing_authority),
                proof_url = COALESCE($8, proof_url),
                tags = COALESCE($9, tags),
                status = COALESCE($10, status),
                verifier_id = COALESCE($11, verifier_id),
                remarks = COALESCE($12, remarks)
            WHERE id = $1 AND student_id = $2
            RETURNING {ACHIEVEMENT_COLUMNS}
            "#
        );
        let achievement = sqlx::query_as::<_, Achievement>(&query)
            .bind(filter.id)
            .bind(filter.owner_id)
            .bind(changes.title)
            .bind(changes.category)
            .bind(changes.description)
            .bind(changes.date)
            .bind(changes.issuing_authority)
            .bind(changes.proof_url)
            .bind(changes.tags)
            .bind(changes.status)
            .bind(changes.verifier)
            .bind(changes.remarks)
            .fetch_optional(&self.pool)
            .await?;
        Ok(achievement)
    }

    async fn delete_one(&self, filter: OwnershipFilter) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM achievements WHERE id = $1 AND student_id = $2")
            .bind(filter.id)
            .bind(filter.owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Achievement>, StoreError> {
        let query = format!("SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE id = $1");
        let achievement = sqlx::query_as::<_, Achievement>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(achievement)
    }

    async fn find_by_status(
        &self,
        status: AchievementStatus,
    ) -> Result<Vec<Achievement>, StoreError> {
        let query = format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements \
             WHERE status = $1 ORDER BY created_at ASC"
        );
        let achievements = sqlx::query_as::<_, Achievement>(&query)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(achievements)
    }

    async fn count_by_status(&self, status: AchievementStatus) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM achievements WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn apply_verification(
        &self,
        id: Uuid,
        verification: Verification,
    ) -> Result<Option<Achievement>, StoreError> {
        let query = format!(
            r#"
            UPDATE achievements
            SET status = $2, verifier_id = $3, remarks = $4, verified_at = $5
            WHERE id = $1 AND status = 'pending'
            RETURNING {ACHIEVEMENT_COLUMNS}
            "#
        );
        let achievement = sqlx::query_as::<_, Achievement>(&query)
            .bind(id)
            .bind(verification.status)
            .bind(verification.verifier_id)
            .bind(verification.remarks)
            .bind(verification.verified_at)
            .fetch_optional(&self.pool)
            .await?;
        Ok(achievement)
    }
}

/// In-process achievement store used when no database is configured
///
/// Records are kept in insertion order; every operation runs under a single
/// lock acquisition.
#[derive(Default)]
pub struct InMemoryAchievementStore {
    records: RwLock<Vec<Achievement>>,
}

impl InMemoryAchievementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(achievement: &Achievement, filter: &OwnershipFilter) -> bool {
    achievement.id == filter.id && achievement.student_id == filter.owner_id
}

#[async_trait]
impl AchievementStore for InMemoryAchievementStore {
    async fn insert(&self, achievement: NewAchievement) -> Result<Achievement, StoreError> {
        let created = Achievement {
            id: Uuid::new_v4(),
            student_id: achievement.student_id,
            title: achievement.title,
            category: achievement.category,
            description: achievement.description,
            date: achievement.date,
            issuing_authority: achievement.issuing_authority,
            proof_url: achievement.proof_url,
            status: AchievementStatus::Pending,
            verifier_id: None,
            remarks: None,
            tags: achievement.tags,
            created_at: Utc::now(),
            verified_at: None,
        };
        self.records.write().await.push(created.clone());
        Ok(created)
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Achievement>, StoreError> {
        let records = self.records.read().await;
        // Reverse insertion order first so equal timestamps still list newest first
        let mut owned: Vec<Achievement> = records
            .iter()
            .rev()
            .filter(|a| a.student_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn find_one(&self, filter: OwnershipFilter) -> Result<Option<Achievement>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|a| matches_filter(a, &filter)).cloned())
    }

    async fn update_one(
        &self,
        filter: OwnershipFilter,
        changes: UpdateAchievementRequest,
    ) -> Result<Option<Achievement>, StoreError> {
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|a| matches_filter(a, &filter)) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            record.title = title;
        }
        if let Some(category) = changes.category {
            record.category = category;
        }
        if changes.description.is_some() {
            record.description = changes.description;
        }
        if changes.date.is_some() {
            record.date = changes.date;
        }
        if changes.issuing_authority.is_some() {
            record.issuing_authority = changes.issuing_authority;
        }
        if changes.proof_url.is_some() {
            record.proof_url = changes.proof_url;
        }
        if let Some(tags) = changes.tags {
            record.tags = tags;
        }
        if let Some(status) = changes.status {
            record.status = status;
        }
        if changes.verifier.is_some() {
            record.verifier_id = changes.verifier;
        }
        if changes.remarks.is_some() {
            record.remarks = changes.remarks;
        }
        Ok(Some(record.clone()))
    }

    async fn delete_one(&self, filter: OwnershipFilter) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|a| !matches_filter(a, &filter));
        Ok(records.len() < before)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Achievement>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_status(
        &self,
        status: AchievementStatus,
    ) -> Result<Vec<Achievement>, StoreError> {
        let records = self.records.read().await;
        let mut matching: Vec<Achievement> = records
            .iter()
            .filter(|a| a.status == status)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matching)
    }

    async fn count_by_status(&self, status: AchievementStatus) -> Result<i64, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|a| a.status == status).count() as i64)
    }

    async fn apply_verification(
        &self,
        id: Uuid,
        verification: Verification,
    ) -> Result<Option<Achievement>, StoreError> {
        let mut records = self.records.write().await;
        let Some(record) = records
            .iter_mut()
            .find(|a| a.id == id && a.status == AchievementStatus::Pending)
        else {
            return Ok(None);
        };

        record.status = verification.status;
        record.verifier_id = Some(verification.verifier_id);
        record.remarks = verification.remarks;
        record.verified_at = Some(verification.verified_at);
        Ok(Some(record.clone()))
    }
}
