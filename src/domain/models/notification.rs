//! Outbound notification requests.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stage::Stage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationKind {
    StageCompleted { stage: Stage },
    RoundAwarded { certificate_number: String },
}

/// One message for a school's primary contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub school_id: Uuid,
    pub school_name: String,
    pub recipient: String,
    pub round_number: u32,
    #[serde(flatten)]
    pub kind: NotificationKind,
}

impl Notification {
    pub fn subject(&self) -> String {
        match &self.kind {
            NotificationKind::StageCompleted { stage } => {
                format!("{} completed the {stage} stage", self.school_name)
            }
            NotificationKind::RoundAwarded { .. } => {
                format!("{} earned its round {} award", self.school_name, self.round_number)
            }
        }
    }
}
