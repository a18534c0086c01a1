//! Evidence submissions and their review status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stage::Stage;

/// Review status of an evidence submission.
///
/// The only transitions are `Pending -> Approved` and `Pending -> Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for EvidenceStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl EvidenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        matches!(
            (self, new_status),
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected)
        )
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A piece of evidence submitted by a school for one stage of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: Uuid,
    pub school_id: Uuid,
    pub stage: Stage,
    pub round_number: u32,
    pub status: EvidenceStatus,
    /// Catalog requirement this evidence addresses, if any
    pub evidence_requirement_id: Option<Uuid>,
    pub submitted_by: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
}

impl Evidence {
    pub fn new(school_id: Uuid, stage: Stage, round_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            school_id,
            stage,
            round_number,
            status: EvidenceStatus::Pending,
            evidence_requirement_id: None,
            submitted_by: None,
            submitted_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
        }
    }

    pub fn with_requirement(mut self, requirement_id: Uuid) -> Self {
        self.evidence_requirement_id = Some(requirement_id);
        self
    }

    pub fn with_submitter(mut self, submitted_by: impl Into<String>) -> Self {
        self.submitted_by = Some(submitted_by.into());
        self
    }

    pub fn is_approved(&self) -> bool {
        self.status == EvidenceStatus::Approved
    }
}

/// The decision recorded by a reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceReview {
    pub status: EvidenceStatus,
    pub reviewer_id: String,
    pub notes: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_can_be_reviewed() {
        assert!(EvidenceStatus::Pending.can_transition_to(EvidenceStatus::Approved));
        assert!(EvidenceStatus::Pending.can_transition_to(EvidenceStatus::Rejected));
        assert!(!EvidenceStatus::Pending.can_transition_to(EvidenceStatus::Pending));
        assert!(!EvidenceStatus::Approved.can_transition_to(EvidenceStatus::Rejected));
        assert!(!EvidenceStatus::Rejected.can_transition_to(EvidenceStatus::Approved));
    }

    #[test]
    fn test_new_evidence_is_pending() {
        let evidence = Evidence::new(Uuid::new_v4(), Stage::Inspire, 1);
        assert_eq!(evidence.status, EvidenceStatus::Pending);
        assert!(!evidence.is_approved());
        assert!(evidence.reviewed_at.is_none());
    }
}
