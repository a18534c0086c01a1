pub mod batch_reconciler;
pub mod certificate_issuer;
pub mod notification_dispatcher;
pub mod override_ledger;
pub mod progression_engine;
pub mod progression_service;
pub mod requirement_calculator;
pub mod round_lifecycle;

pub use batch_reconciler::{BatchReconciler, ReconcileFailure, ReconcileReport};
pub use certificate_issuer::{CertificateIssuer, IssueOutcome};
pub use notification_dispatcher::NotificationDispatcher;
pub use override_ledger::{OverrideLedger, OverrideToggle};
pub use progression_engine::{plan, Inspection, ProgressionEngine, TransitionPlan};
pub use progression_service::{EvidenceSubmission, ProgressionService, ProgressionStores};
pub use requirement_calculator::{tally, RequirementCalculator};
pub use round_lifecycle::RoundLifecycle;
