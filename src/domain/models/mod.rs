pub mod audit;
pub mod certificate;
pub mod config;
pub mod evidence;
pub mod notification;
pub mod progression;
pub mod requirement;
pub mod school;
pub mod stage;

pub use audit::{AuditResponse, AuditStatus, ReductionPromise};
pub use certificate::{AchievementSnapshot, Certificate, CertificateMetadata};
pub use config::{
    Config, DatabaseConfig, LoggingConfig, NotificationConfig, ProgressionConfig,
    ReconcilerConfig, RetryConfig,
};
pub use evidence::{Evidence, EvidenceReview, EvidenceStatus};
pub use notification::{Notification, NotificationKind};
pub use progression::{InvestigateCount, ProgressionCounts, StageCount, TransitionOutcome};
pub use requirement::{AdminEvidenceOverride, Requirement, RequirementStatus, Satisfaction};
pub use school::School;
pub use stage::{Stage, StageThresholds};
