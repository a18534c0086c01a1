//! Requirement counts and state machine outcomes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::certificate::Certificate;
use super::school::School;
use super::stage::Stage;

/// Counted items for an evidence-only stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCount {
    /// Approved evidence rows in the round
    pub approved: u32,
    /// Overrides on requirements not already covered by approved evidence
    pub overrides: u32,
    /// `approved + overrides`
    pub total: u32,
}

impl StageCount {
    pub fn new(approved: u32, overrides: u32) -> Self {
        Self {
            approved,
            overrides,
            total: approved + overrides,
        }
    }
}

/// Counted items for Investigate, which also credits the audit and action plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigateCount {
    pub approved: u32,
    pub overrides: u32,
    pub has_quiz: bool,
    pub has_action_plan: bool,
    /// `approved + overrides + quiz + action plan`
    pub total: u32,
}

impl InvestigateCount {
    pub fn new(approved: u32, overrides: u32, has_quiz: bool, has_action_plan: bool) -> Self {
        Self {
            approved,
            overrides,
            has_quiz,
            has_action_plan,
            total: approved + overrides + u32::from(has_quiz) + u32::from(has_action_plan),
        }
    }
}

/// Snapshot of a school's countable items in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionCounts {
    pub school_id: Uuid,
    pub round_number: u32,
    pub inspire: StageCount,
    pub investigate: InvestigateCount,
    pub act: StageCount,
}

impl ProgressionCounts {
    /// Items compared against the stage threshold.
    pub fn items(&self, stage: Stage) -> u32 {
        match stage {
            Stage::Inspire => self.inspire.total,
            Stage::Investigate => self.investigate.total,
            Stage::Act => self.act.total,
        }
    }
}

/// Result of one state machine run against a school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    /// School as persisted after the run
    pub school: School,
    /// Stages newly completed by this run, in order
    pub completed: Vec<Stage>,
    /// Whether the stored row was written (flags or cached fields)
    pub changed: bool,
    /// Certificate issued by this run, if the round was newly awarded
    pub certificate: Option<Certificate>,
}

impl TransitionOutcome {
    pub fn unchanged(school: School) -> Self {
        Self {
            school,
            completed: Vec::new(),
            changed: false,
            certificate: None,
        }
    }
}
