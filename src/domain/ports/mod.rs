//! Port trait definitions (Hexagonal Architecture)
//!
//! Async interfaces the progression core needs from its collaborators:
//! - Record stores for schools, evidence, overrides and certificates
//! - The static requirement catalog
//! - Audit and action plan signals owned by other workflows
//! - Notification delivery

pub mod certificate_repository;
pub mod evidence_repository;
pub mod notifier;
pub mod override_repository;
pub mod requirement_catalog;
pub mod school_repository;
pub mod signal_sources;

pub use certificate_repository::CertificateRepository;
pub use evidence_repository::EvidenceRepository;
pub use notifier::{Notifier, NotifyError};
pub use override_repository::{OverrideRepository, ToggleResult};
pub use requirement_catalog::RequirementCatalog;
pub use school_repository::SchoolRepository;
pub use signal_sources::{ActionPlanSource, AuditSource};
