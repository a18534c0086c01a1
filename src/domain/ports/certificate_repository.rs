//! Certificate repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Certificate, Stage};

#[async_trait]
pub trait CertificateRepository: Send + Sync {
    /// Insert a certificate.
    ///
    /// The store enforces uniqueness of `(school_id, stage, round_number)`;
    /// a duplicate yields `DomainError::ConstraintViolation`.
    async fn insert(&self, certificate: &Certificate) -> DomainResult<()>;

    /// Find the certificate for a school, stage and round, including
    /// soft-deleted rows.
    async fn find_for_round(
        &self,
        school_id: Uuid,
        stage: Stage,
        round_number: u32,
    ) -> DomainResult<Option<Certificate>>;

    /// Every certificate for a school, oldest round first.
    async fn list_for_school(&self, school_id: Uuid) -> DomainResult<Vec<Certificate>>;
}
