//! Requirement catalog entries and administrator overrides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stage::Stage;

/// A named unit of evidence a stage asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: Uuid,
    pub stage: Stage,
    pub title: String,
    /// Position within the stage, ascending
    pub order_index: u32,
}

impl Requirement {
    pub fn new(stage: Stage, title: impl Into<String>, order_index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            stage,
            title: title.into(),
            order_index,
        }
    }
}

/// An administrator's manual "satisfied" mark for one requirement in one round.
///
/// Presence of the row is the whole signal; toggling deletes or inserts,
/// never updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminEvidenceOverride {
    pub id: Uuid,
    pub school_id: Uuid,
    pub evidence_requirement_id: Uuid,
    pub stage: Stage,
    pub round_number: u32,
    pub marked_by: String,
    pub created_at: DateTime<Utc>,
}

impl AdminEvidenceOverride {
    pub fn new(
        school_id: Uuid,
        evidence_requirement_id: Uuid,
        stage: Stage,
        round_number: u32,
        marked_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            school_id,
            evidence_requirement_id,
            stage,
            round_number,
            marked_by: marked_by.into(),
            created_at: Utc::now(),
        }
    }
}

/// How a catalog requirement is currently satisfied for a school and round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Satisfaction {
    Evidence,
    Override,
    Unsatisfied,
}

/// Per-requirement view used by administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementStatus {
    pub requirement: Requirement,
    pub satisfaction: Satisfaction,
    pub approved_evidence: u32,
    pub pending_evidence: u32,
}
