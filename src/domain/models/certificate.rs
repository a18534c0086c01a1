//! Round certificates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stage::Stage;

/// Snapshot of what the school achieved, frozen at issuance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementSnapshot {
    pub school_name: String,
    pub inspire_items: u32,
    pub investigate_items: u32,
    pub act_items: u32,
    pub rounds_completed: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateMetadata {
    pub round_number: u32,
    #[serde(default)]
    pub achievement: AchievementSnapshot,
}

/// An issued certificate. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: Uuid,
    pub school_id: Uuid,
    pub stage: Stage,
    pub round_number: u32,
    pub certificate_number: String,
    pub metadata: CertificateMetadata,
    pub issued_at: DateTime<Utc>,
    /// Set by an external admin action; soft-deleted rows still block reissue
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Certificate {
    /// Build the award certificate for a school's round.
    pub fn for_round(school_id: Uuid, round_number: u32, achievement: AchievementSnapshot) -> Self {
        let issued_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            school_id,
            stage: Stage::Act,
            round_number,
            certificate_number: certificate_number(round_number, issued_at, school_id),
            metadata: CertificateMetadata {
                round_number,
                achievement,
            },
            issued_at,
            deleted_at: None,
        }
    }
}

/// `R{round}-{yyyymmddHHMMSS}-{first 8 hex of school id}`, upper-cased.
pub fn certificate_number(round_number: u32, at: DateTime<Utc>, school_id: Uuid) -> String {
    let simple = school_id.simple().to_string();
    format!(
        "R{round_number}-{}-{}",
        at.format("%Y%m%d%H%M%S"),
        simple[..8].to_uppercase()
    )
}
