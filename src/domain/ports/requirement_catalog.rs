//! Requirement catalog port (read-only).

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Requirement, Stage};

#[async_trait]
pub trait RequirementCatalog: Send + Sync {
    /// Every requirement, ordered by stage then `order_index`.
    async fn list_all(&self) -> DomainResult<Vec<Requirement>>;

    async fn list_for_stage(&self, stage: Stage) -> DomainResult<Vec<Requirement>>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<Requirement>>;
}
