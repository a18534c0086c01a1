//! Admin override ledger port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::AdminEvidenceOverride;

/// Outcome of a toggle: whether a row now exists, and the row concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleResult {
    pub created: bool,
    /// The inserted row when `created`, otherwise the row that was removed
    pub entry: AdminEvidenceOverride,
}

#[async_trait]
pub trait OverrideRepository: Send + Sync {
    /// Delete the row for `(school, requirement, round)` if present, else insert
    /// `candidate`. Runs atomically.
    async fn toggle(&self, candidate: &AdminEvidenceOverride) -> DomainResult<ToggleResult>;

    /// Overrides recorded for a school in one round.
    async fn list_for_round(
        &self,
        school_id: Uuid,
        round_number: u32,
    ) -> DomainResult<Vec<AdminEvidenceOverride>>;
}
