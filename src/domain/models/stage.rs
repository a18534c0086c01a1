//! Programme stages and the per-stage completion thresholds.

use serde::{Deserialize, Serialize};

/// One of the three ordered phases of the programme.
///
/// Stages are strictly ordered: a school must complete Inspire before
/// Investigate can complete, and Investigate before Act.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Inspire,
    Investigate,
    Act,
}

impl Stage {
    /// All stages in programme order.
    pub const ALL: [Self; 3] = [Self::Inspire, Self::Investigate, Self::Act];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inspire => "inspire",
            Self::Investigate => "investigate",
            Self::Act => "act",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inspire" => Some(Self::Inspire),
            "investigate" => Some(Self::Investigate),
            "act" => Some(Self::Act),
            _ => None,
        }
    }

    /// Progress percentage once this stage is completed.
    pub fn completed_percentage(&self) -> u8 {
        match self {
            Self::Inspire => 33,
            Self::Investigate => 67,
            Self::Act => 100,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of countable items each stage needs before it is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StageThresholds {
    #[serde(default = "default_inspire")]
    pub inspire: u32,

    /// Investigate items include the audit quiz and action plan, not just evidence.
    #[serde(default = "default_investigate")]
    pub investigate: u32,

    #[serde(default = "default_act")]
    pub act: u32,
}

const fn default_inspire() -> u32 {
    3
}

const fn default_investigate() -> u32 {
    2
}

const fn default_act() -> u32 {
    3
}

impl Default for StageThresholds {
    fn default() -> Self {
        Self {
            inspire: default_inspire(),
            investigate: default_investigate(),
            act: default_act(),
        }
    }
}

impl StageThresholds {
    pub fn for_stage(&self, stage: Stage) -> u32 {
        match stage {
            Stage::Inspire => self.inspire,
            Stage::Investigate => self.investigate,
            Stage::Act => self.act,
        }
    }
}
