//! Progression service: the entry point callers use.
//!
//! Wires the calculator, state machine, round lifecycle, override ledger,
//! certificate issuer and reconciler over one set of stores.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::adapters::sqlite::{
    SqliteCertificateRepository, SqliteEvidenceRepository, SqliteOverrideRepository, SqliteRequirementCatalog,
    SqliteSchoolRepository, SqliteSignalRepository,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AdminEvidenceOverride, Certificate, Config, Evidence, EvidenceReview, EvidenceStatus, ProgressionCounts,
    Requirement, RequirementStatus, School, Stage, TransitionOutcome,
};
use crate::domain::ports::{
    ActionPlanSource, AuditSource, CertificateRepository, EvidenceRepository, Notifier, OverrideRepository,
    RequirementCatalog, SchoolRepository, ToggleResult,
};
use crate::services::batch_reconciler::{BatchReconciler, ReconcileReport};
use crate::services::certificate_issuer::CertificateIssuer;
use crate::services::notification_dispatcher::NotificationDispatcher;
use crate::services::override_ledger::{OverrideLedger, OverrideToggle};
use crate::services::progression_engine::ProgressionEngine;
use crate::services::requirement_calculator::RequirementCalculator;
use crate::services::round_lifecycle::RoundLifecycle;

/// The stores the progression core reads and writes.
#[derive(Clone)]
pub struct ProgressionStores {
    pub schools: Arc<dyn SchoolRepository>,
    pub evidence: Arc<dyn EvidenceRepository>,
    pub overrides: Arc<dyn OverrideRepository>,
    pub catalog: Arc<dyn RequirementCatalog>,
    pub certificates: Arc<dyn CertificateRepository>,
    pub audits: Arc<dyn AuditSource>,
    pub action_plans: Arc<dyn ActionPlanSource>,
}

impl ProgressionStores {
    pub fn sqlite(pool: SqlitePool) -> Self {
        let signals = Arc::new(SqliteSignalRepository::new(pool.clone()));
        Self {
            schools: Arc::new(SqliteSchoolRepository::new(pool.clone())),
            evidence: Arc::new(SqliteEvidenceRepository::new(pool.clone())),
            overrides: Arc::new(SqliteOverrideRepository::new(pool.clone())),
            catalog: Arc::new(SqliteRequirementCatalog::new(pool.clone())),
            certificates: Arc::new(SqliteCertificateRepository::new(pool)),
            audits: signals.clone(),
            action_plans: signals,
        }
    }
}

/// Arguments for a new evidence submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceSubmission {
    pub school_id: Uuid,
    pub stage: Stage,
    pub requirement_id: Option<Uuid>,
    pub submitted_by: String,
}

pub struct ProgressionService {
    schools: Arc<dyn SchoolRepository>,
    evidence: Arc<dyn EvidenceRepository>,
    catalog: Arc<dyn RequirementCatalog>,
    calculator: Arc<RequirementCalculator>,
    engine: Arc<ProgressionEngine>,
    lifecycle: RoundLifecycle,
    ledger: OverrideLedger,
    issuer: Arc<CertificateIssuer>,
    reconciler: BatchReconciler,
}

impl ProgressionService {
    pub fn new(stores: ProgressionStores, config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        let calculator = Arc::new(RequirementCalculator::new(
            stores.schools.clone(),
            stores.evidence.clone(),
            stores.overrides.clone(),
            stores.catalog.clone(),
            stores.audits,
            stores.action_plans,
        ));
        let issuer = Arc::new(CertificateIssuer::new(stores.certificates));
        let dispatcher = NotificationDispatcher::new(notifier, config.notifications.retry.clone());
        let engine = Arc::new(ProgressionEngine::new(
            stores.schools.clone(),
            calculator.clone(),
            issuer.clone(),
            dispatcher,
            config.progression.thresholds,
            config.progression.max_update_attempts,
        ));

        Self {
            lifecycle: RoundLifecycle::new(stores.schools.clone(), config.progression.max_update_attempts),
            ledger: OverrideLedger::new(stores.schools.clone(), stores.catalog.clone(), stores.overrides),
            reconciler: BatchReconciler::new(
                stores.schools.clone(),
                engine.clone(),
                config.reconciler.max_concurrency,
            ),
            schools: stores.schools,
            evidence: stores.evidence,
            catalog: stores.catalog,
            calculator,
            engine,
            issuer,
        }
    }

    pub fn from_sqlite(pool: SqlitePool, config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(ProgressionStores::sqlite(pool), config, notifier)
    }

    #[instrument(skip(self))]
    pub async fn register_school(&self, name: &str, contact_email: Option<String>) -> DomainResult<School> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationFailed("school name must not be empty".to_string()));
        }

        let mut school = School::new(name);
        if let Some(email) = contact_email.filter(|e| !e.trim().is_empty()) {
            school = school.with_contact(email);
        }
        self.schools.create(&school).await?;

        info!(school_id = %school.id, "school registered");
        Ok(school)
    }

    pub async fn get_school(&self, school_id: Uuid) -> DomainResult<School> {
        self.schools
            .get(school_id)
            .await?
            .ok_or(DomainError::SchoolNotFound(school_id))
    }

    pub async fn list_schools(&self) -> DomainResult<Vec<School>> {
        self.schools.list().await
    }

    /// Record a pending submission against the school's current round.
    #[instrument(skip(self), fields(school_id = %submission.school_id, stage = %submission.stage))]
    pub async fn submit_evidence(&self, submission: EvidenceSubmission) -> DomainResult<Evidence> {
        let school = self.get_school(submission.school_id).await?;
        if school.award_completed {
            return Err(DomainError::InvalidState(format!(
                "round {} is already awarded; start a new round before submitting",
                school.current_round
            )));
        }

        if let Some(requirement_id) = submission.requirement_id {
            let requirement = self
                .catalog
                .get(requirement_id)
                .await?
                .ok_or(DomainError::RequirementNotFound(requirement_id))?;
            if requirement.stage != submission.stage {
                return Err(DomainError::ValidationFailed(format!(
                    "requirement {requirement_id} belongs to {}, not {}",
                    requirement.stage, submission.stage
                )));
            }
        }

        let mut evidence =
            Evidence::new(school.id, submission.stage, school.current_round).with_submitter(submission.submitted_by);
        if let Some(requirement_id) = submission.requirement_id {
            evidence = evidence.with_requirement(requirement_id);
        }
        self.evidence.create(&evidence).await?;

        info!(evidence_id = %evidence.id, round = evidence.round_number, "evidence submitted");
        Ok(evidence)
    }

    /// Approve or reject a pending submission, then re-run the state machine
    /// for its school.
    ///
    /// The review is committed before evaluation starts, so an evaluation
    /// failure is logged rather than returned; the reconciler repairs it.
    #[instrument(skip(self, notes))]
    pub async fn review_evidence(
        &self,
        evidence_id: Uuid,
        status: EvidenceStatus,
        reviewer_id: &str,
        notes: Option<String>,
    ) -> DomainResult<Evidence> {
        if reviewer_id.trim().is_empty() {
            return Err(DomainError::ValidationFailed("reviewer id must not be empty".to_string()));
        }

        let review = EvidenceReview {
            status,
            reviewer_id: reviewer_id.to_string(),
            notes,
            reviewed_at: Utc::now(),
        };
        let reviewed = self.evidence.apply_review(evidence_id, &review).await?;
        info!(%evidence_id, status = reviewed.status.as_str(), "evidence reviewed");

        if reviewed.is_approved() {
            self.evaluate_after_write(reviewed.school_id).await;
        }
        Ok(reviewed)
    }

    pub async fn list_evidence(&self, school_id: Uuid, round_number: Option<u32>) -> DomainResult<Vec<Evidence>> {
        match round_number {
            Some(round) => self.evidence.list_for_round(school_id, round).await,
            None => self.evidence.list_for_school(school_id).await,
        }
    }

    pub async fn get_progression_counts(
        &self,
        school_id: Uuid,
        round_number: Option<u32>,
    ) -> DomainResult<ProgressionCounts> {
        self.calculator.counts(school_id, round_number).await
    }

    pub async fn requirement_status(
        &self,
        school_id: Uuid,
        round_number: Option<u32>,
    ) -> DomainResult<Vec<RequirementStatus>> {
        self.calculator.requirement_status(school_id, round_number).await
    }

    pub async fn requirements(&self) -> DomainResult<Vec<Requirement>> {
        self.catalog.list_all().await
    }

    pub async fn evaluate(&self, school_id: Uuid) -> DomainResult<TransitionOutcome> {
        self.engine.evaluate(school_id).await
    }

    /// Toggle an override, then re-run the state machine for the school.
    pub async fn toggle_override(&self, request: OverrideToggle) -> DomainResult<ToggleResult> {
        let result = self.ledger.toggle(&request).await?;
        self.evaluate_after_write(request.school_id).await;
        Ok(result)
    }

    /// Overrides recorded for a school, defaulting to its current round.
    pub async fn list_overrides(
        &self,
        school_id: Uuid,
        round_number: Option<u32>,
    ) -> DomainResult<Vec<AdminEvidenceOverride>> {
        let round = match round_number {
            Some(round) => round,
            None => self.get_school(school_id).await?.current_round,
        };
        self.ledger.list_for_round(school_id, round).await
    }

    /// Open the next round and run the state machine on it, so lifetime
    /// signals such as an approved audit are re-applied straight away.
    pub async fn start_new_round(&self, school_id: Uuid) -> DomainResult<School> {
        let started = self.lifecycle.start_new_round(school_id).await?;
        match self.engine.evaluate(school_id).await {
            Ok(outcome) => Ok(outcome.school),
            Err(error) => {
                warn!(%school_id, %error, "evaluation after new round failed");
                Ok(started)
            }
        }
    }

    pub async fn reconcile_all(&self, dry_run: bool) -> DomainResult<ReconcileReport> {
        self.reconciler.reconcile_all(dry_run).await
    }

    pub async fn list_certificates(&self, school_id: Uuid) -> DomainResult<Vec<Certificate>> {
        self.issuer.list_for_school(school_id).await
    }

    async fn evaluate_after_write(&self, school_id: Uuid) {
        if let Err(error) = self.engine.evaluate(school_id).await {
            warn!(%school_id, %error, retryable = error.is_retryable(), "evaluation after write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notify::LogNotifier;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn service() -> ProgressionService {
        let pool = create_migrated_test_pool().await.unwrap();
        ProgressionService::from_sqlite(pool, &Config::default(), Arc::new(LogNotifier))
    }

    #[tokio::test]
    async fn test_register_rejects_blank_name() {
        let service = service().await;
        let err = service.register_school("   ", None).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_submit_checks_requirement_stage() {
        let service = service().await;
        let school = service.register_school("Elm Park", None).await.unwrap();
        let act_requirement = service
            .requirements()
            .await
            .unwrap()
            .into_iter()
            .find(|r| r.stage == Stage::Act)
            .unwrap();

        let err = service
            .submit_evidence(EvidenceSubmission {
                school_id: school.id,
                stage: Stage::Inspire,
                requirement_id: Some(act_requirement.id),
                submitted_by: "teacher-1".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_review_of_unknown_evidence() {
        let service = service().await;
        let err = service
            .review_evidence(Uuid::new_v4(), EvidenceStatus::Approved, "reviewer", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EvidenceNotFound(_)));
    }

    #[tokio::test]
    async fn test_rejected_evidence_does_not_count() {
        let service = service().await;
        let school = service.register_school("Elm Park", None).await.unwrap();

        for _ in 0..3 {
            let evidence = service
                .submit_evidence(EvidenceSubmission {
                    school_id: school.id,
                    stage: Stage::Inspire,
                    requirement_id: None,
                    submitted_by: "teacher-1".to_string(),
                })
                .await
                .unwrap();
            service
                .review_evidence(evidence.id, EvidenceStatus::Rejected, "reviewer", Some("blurry".to_string()))
                .await
                .unwrap();
        }

        let school = service.get_school(school.id).await.unwrap();
        assert!(!school.inspire_completed);
        assert_eq!(service.get_progression_counts(school.id, None).await.unwrap().inspire.total, 0);
    }
}
