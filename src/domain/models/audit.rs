//! Signals owned by external workflows that gate the Investigate stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// The Investigate knowledge check. Only `status == Approved` matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResponse {
    pub id: Uuid,
    pub school_id: Uuid,
    pub status: AuditStatus,
    pub updated_at: DateTime<Utc>,
}

impl AuditResponse {
    pub fn new(school_id: Uuid, status: AuditStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            school_id,
            status,
            updated_at: Utc::now(),
        }
    }
}

/// A school's action plan row. Existence of any row is the whole signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionPromise {
    pub id: Uuid,
    pub school_id: Uuid,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl ReductionPromise {
    pub fn new(school_id: Uuid, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            school_id,
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}
