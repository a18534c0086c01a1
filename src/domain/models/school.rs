//! School domain model.
//!
//! A school carries the per-round progression flags. They are written only by
//! the progression engine (set) and the round lifecycle (reset).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stage::Stage;

/// A school enrolled in the programme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: Uuid,
    pub name: String,
    /// Primary contact, recipient of celebration notifications
    pub contact_email: Option<String>,
    pub current_stage: Stage,
    /// 1-based round counter
    pub current_round: u32,
    pub inspire_completed: bool,
    pub investigate_completed: bool,
    pub act_completed: bool,
    pub award_completed: bool,
    pub audit_quiz_completed: bool,
    /// Cached; always equal to [`School::derived_percentage`] after a write
    pub progress_percentage: u8,
    /// Lifetime count of awarded rounds
    pub rounds_completed: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic lock version, bumped on every flag write
    pub version: i64,
}

impl School {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            contact_email: None,
            current_stage: Stage::Inspire,
            current_round: 1,
            inspire_completed: false,
            investigate_completed: false,
            act_completed: false,
            award_completed: false,
            audit_quiz_completed: false,
            progress_percentage: 0,
            rounds_completed: 0,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    pub fn with_contact(mut self, email: impl Into<String>) -> Self {
        self.contact_email = Some(email.into());
        self
    }

    pub fn is_completed(&self, stage: Stage) -> bool {
        match stage {
            Stage::Inspire => self.inspire_completed,
            Stage::Investigate => self.investigate_completed,
            Stage::Act => self.act_completed,
        }
    }

    pub(crate) fn mark_completed(&mut self, stage: Stage) {
        match stage {
            Stage::Inspire => self.inspire_completed = true,
            Stage::Investigate => self.investigate_completed = true,
            Stage::Act => self.act_completed = true,
        }
    }

    /// Percentage implied by the three completion flags.
    pub fn derived_percentage(&self) -> u8 {
        Stage::ALL
            .iter()
            .rev()
            .find(|stage| self.is_completed(**stage))
            .map_or(0, Stage::completed_percentage)
    }

    /// Stage implied by the completion flags: the first stage not yet
    /// completed, or Act once the whole round is done.
    pub fn derived_stage(&self) -> Stage {
        Stage::ALL
            .into_iter()
            .find(|stage| !self.is_completed(*stage))
            .unwrap_or(Stage::Act)
    }

    /// Recompute the cached fields from the flags.
    pub(crate) fn normalize(&mut self) {
        self.current_stage = self.derived_stage();
        self.progress_percentage = self.derived_percentage();
    }

    /// Move to the next round with every per-round flag cleared.
    ///
    /// `rounds_completed` is lifetime state and is left alone.
    pub(crate) fn begin_next_round(&mut self) {
        self.current_round += 1;
        self.inspire_completed = false;
        self.investigate_completed = false;
        self.act_completed = false;
        self.award_completed = false;
        self.audit_quiz_completed = false;
        self.normalize();
    }

    /// Whether the progression fields of two snapshots match, ignoring
    /// timestamps and version.
    pub fn same_progress(&self, other: &Self) -> bool {
        self.current_stage == other.current_stage
            && self.current_round == other.current_round
            && self.inspire_completed == other.inspire_completed
            && self.investigate_completed == other.investigate_completed
            && self.act_completed == other.act_completed
            && self.award_completed == other.award_completed
            && self.audit_quiz_completed == other.audit_quiz_completed
            && self.progress_percentage == other.progress_percentage
            && self.rounds_completed == other.rounds_completed
    }

    /// Whether the cached stage and percentage agree with the flags.
    pub fn cache_is_consistent(&self) -> bool {
        self.current_stage == self.derived_stage()
            && self.progress_percentage == self.derived_percentage()
    }

    /// `act => investigate => inspire`, and award only alongside act.
    pub fn flags_are_monotonic(&self) -> bool {
        (!self.act_completed || self.investigate_completed)
            && (!self.investigate_completed || self.inspire_completed)
            && (self.award_completed == self.act_completed)
    }
}
