//! Domain errors for the Pathway progression system.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur in the progression core.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("School not found: {0}")]
    SchoolNotFound(Uuid),

    #[error("Evidence not found: {0}")]
    EvidenceNotFound(Uuid),

    #[error("Requirement not found: {0}")]
    RequirementNotFound(Uuid),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Concurrency conflict: {entity} {id} was modified")]
    ConcurrencyConflict { entity: String, id: String },

    #[error("Record store unavailable: {0}")]
    TransientStore(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Whether re-running the whole operation may succeed.
    ///
    /// Flag comparisons make progression writes idempotent, so store outages
    /// and lost compare-and-swap races are both safe to retry.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStore(_) | Self::ConcurrencyConflict { .. })
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SchoolNotFound(_) | Self::EvidenceNotFound(_) | Self::RequirementNotFound(_)
        )
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::ConstraintViolation(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::TransientStore(err.to_string())
            }
            // SQLITE_BUSY / SQLITE_LOCKED surface as database errors with these codes
            sqlx::Error::Database(db) if matches!(db.code().as_deref(), Some("5" | "6")) => {
                Self::TransientStore(err.to_string())
            }
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
