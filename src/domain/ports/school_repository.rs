//! School repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::School;

/// Repository interface for School persistence.
#[async_trait]
pub trait SchoolRepository: Send + Sync {
    /// Register a new school.
    async fn create(&self, school: &School) -> DomainResult<()>;

    /// Get a school by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<School>>;

    /// List every school, oldest first.
    async fn list(&self) -> DomainResult<Vec<School>>;

    /// Write the progression fields of `school` if its stored version still
    /// equals `school.version`.
    ///
    /// Returns the school as stored, with the bumped version. A stale version
    /// yields `DomainError::ConcurrencyConflict` and writes nothing.
    async fn update_progress(&self, school: &School) -> DomainResult<School>;
}
