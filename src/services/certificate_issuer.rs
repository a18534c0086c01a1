//! Idempotent certificate issuance.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AchievementSnapshot, Certificate, Stage};
use crate::domain::ports::CertificateRepository;

/// Result of an issuance request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueOutcome {
    pub certificate: Certificate,
    /// False when a certificate for the round already existed
    pub newly_issued: bool,
}

/// Issues at most one award certificate per school and round.
///
/// The existence check is an optimisation; the store's unique constraint on
/// `(school_id, stage, round_number)` is what makes concurrent callers safe.
pub struct CertificateIssuer {
    certificates: Arc<dyn CertificateRepository>,
}

impl CertificateIssuer {
    pub fn new(certificates: Arc<dyn CertificateRepository>) -> Self {
        Self { certificates }
    }

    #[instrument(skip(self, achievement))]
    pub async fn issue_if_absent(
        &self,
        school_id: Uuid,
        round_number: u32,
        achievement: AchievementSnapshot,
    ) -> DomainResult<IssueOutcome> {
        if let Some(existing) = self.existing(school_id, round_number).await? {
            return Ok(IssueOutcome {
                certificate: existing,
                newly_issued: false,
            });
        }

        let certificate = Certificate::for_round(school_id, round_number, achievement);
        match self.certificates.insert(&certificate).await {
            Ok(()) => {
                info!(
                    %school_id,
                    round = round_number,
                    certificate_number = %certificate.certificate_number,
                    "certificate issued"
                );
                Ok(IssueOutcome {
                    certificate,
                    newly_issued: true,
                })
            }
            Err(DomainError::ConstraintViolation(reason)) => {
                // Another caller won the insert; hand back its row
                let existing = self
                    .existing(school_id, round_number)
                    .await?
                    .ok_or(DomainError::ConstraintViolation(reason))?;
                Ok(IssueOutcome {
                    certificate: existing,
                    newly_issued: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn existing(&self, school_id: Uuid, round_number: u32) -> DomainResult<Option<Certificate>> {
        self.certificates
            .find_for_round(school_id, Stage::Act, round_number)
            .await
    }

    pub async fn list_for_school(&self, school_id: Uuid) -> DomainResult<Vec<Certificate>> {
        self.certificates.list_for_school(school_id).await
    }
}
