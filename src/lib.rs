//! Pathway - school programme progression engine
//!
//! Schools move through three ordered stages of a programme (Inspire,
//! Investigate, Act) by submitting evidence that administrators review.
//! Completing Act awards the round and issues a certificate; the school can
//! then start the next round.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Adapters** (`adapters`): `SQLite` repositories and notification sinks
//! - **Service Layer** (`services`): counting, state machine, rounds,
//!   overrides, certificates and reconciliation
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Certificate, Config, Evidence, EvidenceStatus, ProgressionCounts, School, Stage, StageThresholds,
    TransitionOutcome,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{EvidenceSubmission, OverrideToggle, ProgressionService, ReconcileReport};
