//! Evidence repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Evidence, EvidenceReview};

/// Repository interface for Evidence persistence.
#[async_trait]
pub trait EvidenceRepository: Send + Sync {
    /// Store a new submission.
    async fn create(&self, evidence: &Evidence) -> DomainResult<()>;

    /// Get evidence by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Evidence>>;

    /// All evidence for a school in one round, any status.
    async fn list_for_round(&self, school_id: Uuid, round_number: u32) -> DomainResult<Vec<Evidence>>;

    /// All evidence for a school across rounds, newest first.
    async fn list_for_school(&self, school_id: Uuid) -> DomainResult<Vec<Evidence>>;

    /// Record a review decision on a pending row.
    ///
    /// The write only applies while the row is still pending, so two racing
    /// reviewers cannot both succeed. The loser gets `InvalidState`.
    async fn apply_review(&self, id: Uuid, review: &EvidenceReview) -> DomainResult<Evidence>;
}
