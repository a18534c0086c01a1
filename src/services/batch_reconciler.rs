//! Batch reconciliation.
//!
//! Re-applies the state machine to every school to repair drift: flags unset
//! although thresholds are met, stale cached stage or percentage, or an
//! awarded round with no certificate. Schools are independent, so they are
//! processed concurrently up to a bounded worker count.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::School;
use crate::domain::ports::SchoolRepository;
use crate::services::progression_engine::ProgressionEngine;

/// A school that could not be reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileFailure {
    pub school_id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub examined: usize,
    pub fixed_count: usize,
    /// Schools corrected (or, on a dry run, that would be corrected)
    pub school_ids: Vec<Uuid>,
    pub failed: Vec<ReconcileFailure>,
    pub dry_run: bool,
}

enum SchoolResult {
    Clean,
    Fixed(Uuid),
    Failed(Uuid, DomainError),
}

pub struct BatchReconciler {
    schools: Arc<dyn SchoolRepository>,
    engine: Arc<ProgressionEngine>,
    max_concurrency: usize,
}

impl BatchReconciler {
    pub fn new(schools: Arc<dyn SchoolRepository>, engine: Arc<ProgressionEngine>, max_concurrency: usize) -> Self {
        Self {
            schools,
            engine,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Reconcile every school. A second run with no intervening changes
    /// reports nothing fixed.
    #[instrument(skip(self))]
    pub async fn reconcile_all(&self, dry_run: bool) -> DomainResult<ReconcileReport> {
        let schools = self.schools.list().await?;
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut handles = Vec::with_capacity(schools.len());

        for school in schools {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| DomainError::InvalidState("reconciler semaphore closed".to_string()))?;
            let engine = self.engine.clone();
            let school_id = school.id;

            let handle = tokio::spawn(async move {
                let _permit = permit;
                reconcile_school(&engine, school, dry_run).await
            });
            handles.push((school_id, handle));
        }

        let mut report = ReconcileReport {
            examined: handles.len(),
            dry_run,
            ..ReconcileReport::default()
        };

        let results = join_all(handles.into_iter().map(|(school_id, handle)| async move {
            handle
                .await
                .unwrap_or_else(|e| SchoolResult::Failed(school_id, DomainError::InvalidState(e.to_string())))
        }))
        .await;

        for result in results {
            match result {
                SchoolResult::Clean => {}
                SchoolResult::Fixed(id) => report.school_ids.push(id),
                SchoolResult::Failed(id, error) => {
                    warn!(school_id = %id, %error, "reconcile failed for school");
                    report.failed.push(ReconcileFailure {
                        school_id: id,
                        error: error.to_string(),
                    });
                }
            }
        }
        report.fixed_count = report.school_ids.len();

        info!(
            examined = report.examined,
            fixed = report.fixed_count,
            failed = report.failed.len(),
            dry_run,
            "reconciliation finished"
        );
        Ok(report)
    }
}

async fn reconcile_school(engine: &ProgressionEngine, school: School, dry_run: bool) -> SchoolResult {
    let school_id = school.id;

    let inspection = match engine.inspect_school(school).await {
        Ok(inspection) => inspection,
        Err(e) => return SchoolResult::Failed(school_id, e),
    };
    if !inspection.needs_repair() {
        return SchoolResult::Clean;
    }
    if dry_run {
        return SchoolResult::Fixed(school_id);
    }

    match engine.evaluate(school_id).await {
        Ok(outcome) if outcome.changed || outcome.certificate.is_some() => SchoolResult::Fixed(school_id),
        Ok(_) => SchoolResult::Clean,
        Err(e) => SchoolResult::Failed(school_id, e),
    }
}
