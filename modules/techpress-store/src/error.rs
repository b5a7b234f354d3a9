use techpress_common::TechpressError;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("No {kind} with id {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Write rejected: {0}")]
    Rejected(String),
}

impl From<StoreError> for TechpressError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => TechpressError::NotFound(err.to_string()),
            other => TechpressError::Store(other.to_string()),
        }
    }
}
