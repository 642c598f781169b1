// Shared persistence error type for every store adapter

/// Errors raised by store adapters
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write; nothing was persisted
    #[error("duplicate value for unique field `{field}`")]
    Conflict { field: &'static str },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Map a failed write to `Conflict` when the database reports a unique violation
pub(crate) fn map_unique_violation(error: sqlx::Error, field: &'static str) -> StoreError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return StoreError::Conflict { field };
        }
    }
    StoreError::Database(error)
}
