//! Progression state machine.
//!
//! [`plan`] is the pure transition function: given a school snapshot and its
//! round counts it returns the next snapshot. [`ProgressionEngine::evaluate`]
//! wraps it in a compare-and-swap loop against the school row and fires the
//! side effects of whichever run actually wins the write.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AchievementSnapshot, Certificate, Notification, NotificationKind, ProgressionCounts, School, Stage,
    StageThresholds, TransitionOutcome,
};
use crate::domain::ports::SchoolRepository;
use crate::services::certificate_issuer::CertificateIssuer;
use crate::services::notification_dispatcher::NotificationDispatcher;
use crate::services::requirement_calculator::RequirementCalculator;

/// Next snapshot proposed by [`plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub next: School,
    /// Stages that flip to completed, in programme order
    pub completed: Vec<Stage>,
    /// Whether `next` differs from the input in any persisted progression field
    pub changed: bool,
}

/// Compute the next progression snapshot.
///
/// Flags are only ever set here, never cleared. Stages are walked in order and
/// the walk stops at the first stage whose threshold is unmet, so a later
/// stage can never complete ahead of an earlier one.
pub fn plan(school: &School, counts: &ProgressionCounts, thresholds: &StageThresholds) -> TransitionPlan {
    let mut next = school.clone();
    let mut completed = Vec::new();

    for stage in Stage::ALL {
        if next.is_completed(stage) {
            continue;
        }
        if counts.items(stage) < thresholds.for_stage(stage) {
            break;
        }
        next.mark_completed(stage);
        completed.push(stage);
    }

    if counts.investigate.has_quiz {
        next.audit_quiz_completed = true;
    }

    if completed.contains(&Stage::Act) {
        next.award_completed = true;
        next.rounds_completed += 1;
    } else if next.act_completed && !next.award_completed {
        next.award_completed = true;
    }

    next.normalize();
    let changed = !next.same_progress(school);

    TransitionPlan {
        next,
        completed,
        changed,
    }
}

/// Read-only view of what [`ProgressionEngine::evaluate`] would do.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub school: School,
    pub counts: ProgressionCounts,
    pub plan: TransitionPlan,
    /// Round is awarded but has no certificate row
    pub certificate_missing: bool,
}

impl Inspection {
    pub fn needs_repair(&self) -> bool {
        self.plan.changed || self.certificate_missing
    }
}

pub struct ProgressionEngine {
    schools: Arc<dyn SchoolRepository>,
    calculator: Arc<RequirementCalculator>,
    issuer: Arc<CertificateIssuer>,
    dispatcher: NotificationDispatcher,
    thresholds: StageThresholds,
    max_update_attempts: u32,
}

impl ProgressionEngine {
    pub fn new(
        schools: Arc<dyn SchoolRepository>,
        calculator: Arc<RequirementCalculator>,
        issuer: Arc<CertificateIssuer>,
        dispatcher: NotificationDispatcher,
        thresholds: StageThresholds,
        max_update_attempts: u32,
    ) -> Self {
        Self {
            schools,
            calculator,
            issuer,
            dispatcher,
            thresholds,
            max_update_attempts: max_update_attempts.max(1),
        }
    }

    /// Re-run the state machine for a school's current round.
    ///
    /// Safe to call any number of times, concurrently. Only the caller whose
    /// compare-and-swap lands sees the newly completed stages; every other
    /// caller re-reads and finds nothing left to do.
    #[instrument(skip(self))]
    pub async fn evaluate(&self, school_id: Uuid) -> DomainResult<TransitionOutcome> {
        for attempt in 1..=self.max_update_attempts {
            let school = self.load_school(school_id).await?;
            let counts = self.calculator.counts_for(&school, school.current_round).await?;
            let plan = plan(&school, &counts, &self.thresholds);

            if !plan.changed {
                let mut outcome = TransitionOutcome::unchanged(school);
                if outcome.school.award_completed {
                    outcome.certificate = self.ensure_certificate(&outcome.school, &counts).await?;
                }
                return Ok(outcome);
            }

            match self.schools.update_progress(&plan.next).await {
                Ok(stored) => return self.apply_side_effects(stored, plan.completed, &counts).await,
                Err(DomainError::ConcurrencyConflict { .. }) => {
                    debug!(%school_id, attempt, "school row changed underneath evaluation, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(%school_id, attempts = self.max_update_attempts, "gave up evaluating school");
        Err(DomainError::ConcurrencyConflict {
            entity: "school".to_string(),
            id: school_id.to_string(),
        })
    }

    /// Compute what `evaluate` would change without writing anything.
    pub async fn inspect_school(&self, school: School) -> DomainResult<Inspection> {
        let counts = self.calculator.counts_for(&school, school.current_round).await?;
        let plan = plan(&school, &counts, &self.thresholds);
        let certificate_missing = plan.next.award_completed
            && self.issuer.existing(school.id, school.current_round).await?.is_none();

        Ok(Inspection {
            school,
            counts,
            plan,
            certificate_missing,
        })
    }

    async fn apply_side_effects(
        &self,
        school: School,
        completed: Vec<Stage>,
        counts: &ProgressionCounts,
    ) -> DomainResult<TransitionOutcome> {
        for stage in &completed {
            info!(
                school_id = %school.id,
                round = school.current_round,
                %stage,
                progress = school.progress_percentage,
                "stage completed"
            );
            if *stage != Stage::Act {
                self.notify(&school, NotificationKind::StageCompleted { stage: *stage });
            }
        }

        // The issuer's existence check keeps this to one row even if another
        // evaluation is repairing the same round
        let certificate = if school.award_completed {
            self.ensure_certificate(&school, counts).await?
        } else {
            None
        };

        Ok(TransitionOutcome {
            school,
            completed,
            changed: true,
            certificate,
        })
    }

    /// Issue the round certificate if it is missing. Returns it only when this
    /// call created it, after queueing the award notification.
    async fn ensure_certificate(
        &self,
        school: &School,
        counts: &ProgressionCounts,
    ) -> DomainResult<Option<Certificate>> {
        let achievement = AchievementSnapshot {
            school_name: school.name.clone(),
            inspire_items: counts.items(Stage::Inspire),
            investigate_items: counts.items(Stage::Investigate),
            act_items: counts.items(Stage::Act),
            rounds_completed: school.rounds_completed,
        };

        let issued = self
            .issuer
            .issue_if_absent(school.id, school.current_round, achievement)
            .await?;
        if !issued.newly_issued {
            return Ok(None);
        }

        self.notify(
            school,
            NotificationKind::RoundAwarded {
                certificate_number: issued.certificate.certificate_number.clone(),
            },
        );
        Ok(Some(issued.certificate))
    }

    fn notify(&self, school: &School, kind: NotificationKind) {
        let Some(recipient) = school.contact_email.clone() else {
            debug!(school_id = %school.id, "no contact on file, skipping notification");
            return;
        };
        // Detached: delivery outcome never reaches the caller
        drop(self.dispatcher.dispatch(Notification {
            school_id: school.id,
            school_name: school.name.clone(),
            recipient,
            round_number: school.current_round,
            kind,
        }));
    }

    async fn load_school(&self, school_id: Uuid) -> DomainResult<School> {
        self.schools
            .get(school_id)
            .await?
            .ok_or(DomainError::SchoolNotFound(school_id))
    }
}
