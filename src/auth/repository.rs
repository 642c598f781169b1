// Credential store: user persistence port and its adapters

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::models::{NewUser, UpdateProfileRequest, User, UserCredentials, UserSummary};
use crate::store::{map_unique_violation, StoreError};

const USER_COLUMNS: &str =
    "id, name, email, role, bio, institute, linkedin, github, portfolio, created_at";

/// Persistence port for user records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; a taken email yields `StoreError::Conflict { field: "email" }`
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Fetch a user by id, without the password hash
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Fetch login credentials by email (case-insensitive)
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, StoreError>;

    /// Merge profile fields into a user record
    async fn update_profile(
        &self,
        id: Uuid,
        changes: UpdateProfileRequest,
    ) -> Result<Option<User>, StoreError>;

    /// Resolve display fields for a set of ids; unknown ids are skipped
    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>, StoreError>;
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let query = format!(
            "INSERT INTO users (id, name, email, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(user.email.to_lowercase())
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "email"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, email, password_hash FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credentials)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: UpdateProfileRequest,
    ) -> Result<Option<User>, StoreError> {
        let query = format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                bio = COALESCE($3, bio), \
                institute = COALESCE($4, institute), \
                linkedin = COALESCE($5, linkedin), \
                github = COALESCE($6, github), \
                portfolio = COALESCE($7, portfolio) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(changes.name)
            .bind(changes.bio)
            .bind(changes.institute)
            .bind(changes.linkedin)
            .bind(changes.github)
            .bind(changes.portfolio)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let summaries = sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, email, role FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(summaries)
    }
}

struct StoredUser {
    user: User,
    password_hash: String,
}

/// In-process user store used when no database is configured
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<StoredUser>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let email = new_user.email.to_lowercase();
        let mut users = self.users.write().await;
        if users.iter().any(|stored| stored.user.email == email) {
            return Err(StoreError::Conflict { field: "email" });
        }

        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email,
            role: new_user.role,
            bio: None,
            institute: None,
            linkedin: None,
            github: None,
            portfolio: None,
            created_at: Utc::now(),
        };
        users.push(StoredUser {
            user: user.clone(),
            password_hash: new_user.password_hash,
        });
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|stored| stored.user.id == id)
            .map(|stored| stored.user.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        let email = email.to_lowercase();
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|stored| stored.user.email == email)
            .map(|stored| UserCredentials {
                id: stored.user.id,
                email: stored.user.email.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: UpdateProfileRequest,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        let Some(stored) = users.iter_mut().find(|stored| stored.user.id == id) else {
            return Ok(None);
        };

        let user = &mut stored.user;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if changes.bio.is_some() {
            user.bio = changes.bio;
        }
        if changes.institute.is_some() {
            user.institute = changes.institute;
        }
        if changes.linkedin.is_some() {
            user.linkedin = changes.linkedin;
        }
        if changes.github.is_some() {
            user.github = changes.github;
        }
        if changes.portfolio.is_some() {
            user.portfolio = changes.portfolio;
        }
        Ok(Some(user.clone()))
    }

    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|stored| ids.contains(&stored.user.id))
            .map(|stored| UserSummary::from(&stored.user))
            .collect())
    }
}
