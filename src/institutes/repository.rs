use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::institutes::{Institute, NewInstitute, UpdateInstituteRequest};
use crate::store::{map_unique_violation, StoreError};

const INSTITUTE_COLUMNS: &str = "id, code, name, institute_type, address, city, state, pincode, \
    faculty, head_id, created_by, created_at";

/// Persistence port for institutes
///
/// `code` is unique; a write that would duplicate it fails with
/// [`StoreError::Conflict`] and persists nothing.
#[async_trait]
pub trait InstituteStore: Send + Sync {
    async fn insert(&self, institute: NewInstitute) -> Result<Institute, StoreError>;

    /// All institutes ordered by name
    async fn list(&self) -> Result<Vec<Institute>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Institute>, StoreError>;

    async fn update(
        &self,
        id: Uuid,
        changes: UpdateInstituteRequest,
    ) -> Result<Option<Institute>, StoreError>;

    /// Remove an institute, returning the removed record
    async fn delete(&self, id: Uuid) -> Result<Option<Institute>, StoreError>;
}

/// PostgreSQL-backed institute repository
#[derive(Clone)]
pub struct PgInstituteRepository {
    pool: PgPool,
}

impl PgInstituteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstituteStore for PgInstituteRepository {
    async fn insert(&self, institute: NewInstitute) -> Result<Institute, StoreError> {
        let query = format!(
            r#"
            INSERT INTO institutes
                (id, code, name, institute_type, address, city, state, pincode,
                 faculty, head_id, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {INSTITUTE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Institute>(&query)
            .bind(Uuid::new_v4())
            .bind(&institute.code)
            .bind(&institute.name)
            .bind(institute.institute_type)
            .bind(&institute.address)
            .bind(&institute.city)
            .bind(&institute.state)
            .bind(&institute.pincode)
            .bind(&institute.faculty)
            .bind(institute.head_id)
            .bind(institute.created_by)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "code"))
    }

    async fn list(&self) -> Result<Vec<Institute>, StoreError> {
        let query = format!("SELECT {INSTITUTE_COLUMNS} FROM institutes ORDER BY name ASC");
        let institutes = sqlx::query_as::<_, Institute>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(institutes)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Institute>, StoreError> {
        let query = format!("SELECT {INSTITUTE_COLUMNS} FROM institutes WHERE id = $1");
        let institute = sqlx::query_as::<_, Institute>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(institute)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UpdateInstituteRequest,
    ) -> Result<Option<Institute>, StoreError> {
        let query = format!(
            r#"
            UPDATE institutes
            SET code = COALESCE($2, code),
                name = COALESCE($3, name),
                institute_type = COALESCE($4, institute_type),
                address = COALESCE($5, address),
                city = COALESCE($6, city),
                state = COALESCE($7, state),
                pincode = COALESCE($8, pincode),
                faculty = COALESCE($9, faculty),
                head_id = COALESCE($10, head_id)
            WHERE id = $1
            RETURNING {INSTITUTE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Institute>(&query)
            .bind(id)
            .bind(changes.code)
            .bind(changes.name)
            .bind(changes.institute_type)
            .bind(changes.address)
            .bind(changes.city)
            .bind(changes.state)
            .bind(changes.pincode)
            .bind(changes.faculty)
            .bind(changes.head)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "code"))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Institute>, StoreError> {
        let query = format!("DELETE FROM institutes WHERE id = $1 RETURNING {INSTITUTE_COLUMNS}");
        let institute = sqlx::query_as::<_, Institute>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(institute)
    }
}

/// In-process institute store used when no database is configured
#[derive(Default)]
pub struct InMemoryInstituteStore {
    records: RwLock<Vec<Institute>>,
}

impl InMemoryInstituteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InstituteStore for InMemoryInstituteStore {
    async fn insert(&self, institute: NewInstitute) -> Result<Institute, StoreError> {
        let mut records = self.records.write().await;
        if records.iter().any(|i| i.code == institute.code) {
            return Err(StoreError::Conflict { field: "code" });
        }

        let created = Institute {
            id: Uuid::new_v4(),
            code: institute.code,
            name: institute.name,
            institute_type: institute.institute_type,
            address: institute.address,
            city: institute.city,
            state: institute.state,
            pincode: institute.pincode,
            faculty: institute.faculty,
            head_id: institute.head_id,
            created_by: institute.created_by,
            created_at: Utc::now(),
        };
        records.push(created.clone());
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Institute>, StoreError> {
        let mut institutes = self.records.read().await.clone();
        institutes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(institutes)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Institute>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|i| i.id == id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UpdateInstituteRequest,
    ) -> Result<Option<Institute>, StoreError> {
        let mut records = self.records.write().await;
        if let Some(code) = &changes.code {
            if records.iter().any(|i| i.id != id && &i.code == code) {
                return Err(StoreError::Conflict { field: "code" });
            }
        }
        let Some(record) = records.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };

        if let Some(code) = changes.code {
            record.code = code;
        }
        if let Some(name) = changes.name {
            record.name = name;
        }
        if let Some(institute_type) = changes.institute_type {
            record.institute_type = institute_type;
        }
        if changes.address.is_some() {
            record.address = changes.address;
        }
        if changes.city.is_some() {
            record.city = changes.city;
        }
        if changes.state.is_some() {
            record.state = changes.state;
        }
        if changes.pincode.is_some() {
            record.pincode = changes.pincode;
        }
        if let Some(faculty) = changes.faculty {
            record.faculty = faculty;
        }
        if changes.head.is_some() {
            record.head_id = changes.head;
        }
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Institute>, StoreError> {
        let mut records = self.records.write().await;
        let position = records.iter().position(|i| i.id == id);
        Ok(position.map(|index| records.remove(index)))
    }
}
