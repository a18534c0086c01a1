//! Read-only views onto workflows owned outside the progression core.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;

/// Audit review workflow.
#[async_trait]
pub trait AuditSource: Send + Sync {
    /// Whether the school has an approved audit response, in any round.
    async fn has_approved_audit(&self, school_id: Uuid) -> DomainResult<bool>;
}

/// Action plan store.
#[async_trait]
pub trait ActionPlanSource: Send + Sync {
    /// Whether the school has at least one reduction promise.
    async fn has_action_plan(&self, school_id: Uuid) -> DomainResult<bool>;
}
