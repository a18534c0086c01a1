//! Common test utilities for integration tests
//!
//! Provides an in-memory service, a recording notifier and helpers that
//! drive schools through stages.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use pathway::adapters::sqlite::{
    create_migrated_test_pool, database_url, initialize_database, SqliteSignalRepository,
};
use pathway::domain::models::{
    Config, EvidenceStatus, Notification, NotificationKind, ReductionPromise, School, Stage,
};
use pathway::domain::ports::{Notifier, NotifyError};
use pathway::services::{EvidenceSubmission, ProgressionService};

/// Seeded catalog requirement `n` (1-based) of a stage.
pub fn requirement_id(stage: Stage, n: u8) -> Uuid {
    let prefix = match stage {
        Stage::Inspire => "11111111",
        Stage::Investigate => "22222222",
        Stage::Act => "33333333",
    };
    Uuid::parse_str(&format!("{prefix}-0000-4000-8000-00000000000{n}")).expect("seeded requirement id")
}

/// Collects every delivered notification.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier lock").clone()
    }

    pub fn awards(&self) -> usize {
        self.sent()
            .iter()
            .filter(|n| matches!(n.kind, NotificationKind::RoundAwarded { .. }))
            .count()
    }

    pub fn stage_completions(&self, stage: Stage) -> usize {
        self.sent()
            .iter()
            .filter(|n| n.kind == NotificationKind::StageCompleted { stage })
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().expect("notifier lock").push(notification.clone());
        Ok(())
    }
}

pub struct TestContext {
    pub pool: SqlitePool,
    pub service: ProgressionService,
    pub notifier: Arc<RecordingNotifier>,
    pub signals: SqliteSignalRepository,
}

pub async fn setup() -> TestContext {
    setup_with_config(test_config()).await
}

pub async fn setup_with_config(config: Config) -> TestContext {
    let pool = create_migrated_test_pool().await.expect("failed to create test database");
    context_for(pool, &config)
}

/// Service over a WAL database file with a multi-connection pool. The
/// directory must outlive the context.
pub async fn setup_file_backed() -> (TestContext, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let url = database_url(dir.path().join("pathway.db"));
    let pool = initialize_database(&url, None).await.expect("failed to create file database");
    (context_for(pool, &test_config()), dir)
}

fn context_for(pool: SqlitePool, config: &Config) -> TestContext {
    let notifier = Arc::new(RecordingNotifier::default());
    let service = ProgressionService::from_sqlite(pool.clone(), config, notifier.clone());
    TestContext {
        signals: SqliteSignalRepository::new(pool.clone()),
        pool,
        service,
        notifier,
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.notifications.retry.initial_backoff_ms = 1;
    config.notifications.retry.max_backoff_ms = 5;
    config
}

impl TestContext {
    pub async fn register(&self, name: &str) -> School {
        self.service
            .register_school(name, Some(format!("head@{}.example", name.to_lowercase().replace(' ', "-"))))
            .await
            .expect("failed to register school")
    }

    /// Submit and approve one piece of evidence for the school's current round.
    pub async fn approve(&self, school_id: Uuid, stage: Stage, requirement: Option<Uuid>) -> School {
        let evidence = self
            .service
            .submit_evidence(EvidenceSubmission {
                school_id,
                stage,
                requirement_id: requirement,
                submitted_by: "teacher".to_string(),
            })
            .await
            .expect("failed to submit evidence");
        self.service
            .review_evidence(evidence.id, EvidenceStatus::Approved, "reviewer", None)
            .await
            .expect("failed to review evidence");
        self.service.get_school(school_id).await.expect("school exists")
    }

    /// Approve `n` evidence items, each against a distinct catalog requirement.
    pub async fn approve_n(&self, school_id: Uuid, stage: Stage, n: u8) -> School {
        let mut school = self.service.get_school(school_id).await.expect("school exists");
        for i in 1..=n {
            school = self.approve(school_id, stage, Some(requirement_id(stage, i))).await;
        }
        school
    }

    /// Record an approved audit and an action plan, which together meet the
    /// Investigate threshold.
    pub async fn complete_investigate_signals(&self, school_id: Uuid) {
        self.signals.approve_audit(school_id).await.expect("audit saved");
        self.signals
            .add_reduction_promise(&ReductionPromise::new(school_id, "Switch to refill stations"))
            .await
            .expect("action plan saved");
        self.service.evaluate(school_id).await.expect("evaluate");
    }

    /// Drive a school through the whole round.
    pub async fn complete_round(&self, school_id: Uuid) -> School {
        self.approve_n(school_id, Stage::Inspire, 3).await;
        self.complete_investigate_signals(school_id).await;
        self.approve_n(school_id, Stage::Act, 3).await
    }
}

/// Poll until `predicate` holds or the timeout elapses.
pub async fn wait_for<F>(mut predicate: F, timeout: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    predicate()
}
