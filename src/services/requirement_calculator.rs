//! Requirement satisfaction calculator.
//!
//! Aggregates approved evidence, admin overrides and the Investigate signals
//! (approved audit, action plan) into per-stage item counts for one round.
//! Read-only: nothing here writes to the store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AdminEvidenceOverride, Evidence, EvidenceStatus, InvestigateCount, ProgressionCounts,
    RequirementStatus, Satisfaction, School, Stage, StageCount,
};
use crate::domain::ports::{
    ActionPlanSource, AuditSource, EvidenceRepository, OverrideRepository, RequirementCatalog,
    SchoolRepository,
};

pub struct RequirementCalculator {
    schools: Arc<dyn SchoolRepository>,
    evidence: Arc<dyn EvidenceRepository>,
    overrides: Arc<dyn OverrideRepository>,
    catalog: Arc<dyn RequirementCatalog>,
    audits: Arc<dyn AuditSource>,
    action_plans: Arc<dyn ActionPlanSource>,
}

impl RequirementCalculator {
    pub fn new(
        schools: Arc<dyn SchoolRepository>,
        evidence: Arc<dyn EvidenceRepository>,
        overrides: Arc<dyn OverrideRepository>,
        catalog: Arc<dyn RequirementCatalog>,
        audits: Arc<dyn AuditSource>,
        action_plans: Arc<dyn ActionPlanSource>,
    ) -> Self {
        Self {
            schools,
            evidence,
            overrides,
            catalog,
            audits,
            action_plans,
        }
    }

    /// Counts for a school, defaulting to its current round.
    #[instrument(skip(self))]
    pub async fn counts(&self, school_id: Uuid, round_number: Option<u32>) -> DomainResult<ProgressionCounts> {
        let school = self.load_school(school_id).await?;
        let round = round_number.unwrap_or(school.current_round);
        self.counts_for(&school, round).await
    }

    /// Counts for an already-loaded school.
    pub async fn counts_for(&self, school: &School, round_number: u32) -> DomainResult<ProgressionCounts> {
        let evidence = self.evidence.list_for_round(school.id, round_number).await?;
        let overrides = self.overrides.list_for_round(school.id, round_number).await?;
        // Audit and action plan are lifetime signals, not per round
        let has_quiz = self.audits.has_approved_audit(school.id).await?;
        let has_action_plan = self.action_plans.has_action_plan(school.id).await?;

        Ok(tally(school.id, round_number, &evidence, &overrides, has_quiz, has_action_plan))
    }

    /// Per-requirement satisfaction for a school and round.
    #[instrument(skip(self))]
    pub async fn requirement_status(
        &self,
        school_id: Uuid,
        round_number: Option<u32>,
    ) -> DomainResult<Vec<RequirementStatus>> {
        let school = self.load_school(school_id).await?;
        let round = round_number.unwrap_or(school.current_round);

        let requirements = self.catalog.list_all().await?;
        let evidence = self.evidence.list_for_round(school.id, round).await?;
        let overridden: HashSet<Uuid> = self
            .overrides
            .list_for_round(school.id, round)
            .await?
            .into_iter()
            .map(|o| o.evidence_requirement_id)
            .collect();

        let mut approved: HashMap<Uuid, u32> = HashMap::new();
        let mut pending: HashMap<Uuid, u32> = HashMap::new();
        for item in &evidence {
            let Some(requirement_id) = item.evidence_requirement_id else {
                continue;
            };
            match item.status {
                EvidenceStatus::Approved => *approved.entry(requirement_id).or_default() += 1,
                EvidenceStatus::Pending => *pending.entry(requirement_id).or_default() += 1,
                EvidenceStatus::Rejected => {}
            }
        }

        Ok(requirements
            .into_iter()
            .map(|requirement| {
                let approved_evidence = approved.get(&requirement.id).copied().unwrap_or(0);
                let satisfaction = if approved_evidence > 0 {
                    Satisfaction::Evidence
                } else if overridden.contains(&requirement.id) {
                    Satisfaction::Override
                } else {
                    Satisfaction::Unsatisfied
                };
                RequirementStatus {
                    pending_evidence: pending.get(&requirement.id).copied().unwrap_or(0),
                    requirement,
                    satisfaction,
                    approved_evidence,
                }
            })
            .collect())
    }

    async fn load_school(&self, school_id: Uuid) -> DomainResult<School> {
        self.schools
            .get(school_id)
            .await?
            .ok_or(DomainError::SchoolNotFound(school_id))
    }
}

/// Fold one round's rows into per-stage counts.
///
/// `approved` is the raw number of approved rows. An override only adds an
/// item when no approved evidence already covers the same requirement.
pub fn tally(
    school_id: Uuid,
    round_number: u32,
    evidence: &[Evidence],
    overrides: &[AdminEvidenceOverride],
    has_quiz: bool,
    has_action_plan: bool,
) -> ProgressionCounts {
    let stage_totals = |stage: Stage| -> (u32, u32) {
        let approved: Vec<&Evidence> = evidence
            .iter()
            .filter(|e| e.round_number == round_number && e.stage == stage && e.is_approved())
            .collect();
        let covered: HashSet<Uuid> = approved.iter().filter_map(|e| e.evidence_requirement_id).collect();
        let extra: HashSet<Uuid> = overrides
            .iter()
            .filter(|o| o.round_number == round_number && o.stage == stage)
            .map(|o| o.evidence_requirement_id)
            .filter(|id| !covered.contains(id))
            .collect();

        (count(approved.len()), count(extra.len()))
    };

    let (inspire_approved, inspire_overrides) = stage_totals(Stage::Inspire);
    let (investigate_approved, investigate_overrides) = stage_totals(Stage::Investigate);
    let (act_approved, act_overrides) = stage_totals(Stage::Act);

    ProgressionCounts {
        school_id,
        round_number,
        inspire: StageCount::new(inspire_approved, inspire_overrides),
        investigate: InvestigateCount::new(
            investigate_approved,
            investigate_overrides,
            has_quiz,
            has_action_plan,
        ),
        act: StageCount::new(act_approved, act_overrides),
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
