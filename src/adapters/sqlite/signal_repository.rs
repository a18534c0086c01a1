//! SQLite views onto the audit review and action plan tables.
//!
//! Both tables are owned by workflows outside the progression core. The
//! write helpers here are what those workflows (and tests) use to record
//! their results.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AuditResponse, AuditStatus, ReductionPromise};
use crate::domain::ports::{ActionPlanSource, AuditSource};

#[derive(Clone)]
pub struct SqliteSignalRepository {
    pool: SqlitePool,
}

impl SqliteSignalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace an audit response.
    pub async fn save_audit(&self, audit: &AuditResponse) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO audit_responses (id, school_id, status, updated_at) VALUES (?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET status = excluded.status, updated_at = excluded.updated_at"#,
        )
        .bind(audit.id.to_string())
        .bind(audit.school_id.to_string())
        .bind(audit.status.as_str())
        .bind(audit.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record an approved audit for a school.
    pub async fn approve_audit(&self, school_id: Uuid) -> DomainResult<AuditResponse> {
        let audit = AuditResponse::new(school_id, AuditStatus::Approved);
        self.save_audit(&audit).await?;
        Ok(audit)
    }

    pub async fn add_reduction_promise(&self, promise: &ReductionPromise) -> DomainResult<()> {
        sqlx::query("INSERT INTO reduction_promises (id, school_id, description, created_at) VALUES (?, ?, ?, ?)")
            .bind(promise.id.to_string())
            .bind(promise.school_id.to_string())
            .bind(&promise.description)
            .bind(promise.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AuditSource for SqliteSignalRepository {
    async fn has_approved_audit(&self, school_id: Uuid) -> DomainResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM audit_responses WHERE school_id = ? AND status = 'approved')",
        )
        .bind(school_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl ActionPlanSource for SqliteSignalRepository {
    async fn has_action_plan(&self, school_id: Uuid) -> DomainResult<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM reduction_promises WHERE school_id = ?)")
                .bind(school_id.to_string())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteSchoolRepository};
    use crate::domain::models::School;
    use crate::domain::ports::SchoolRepository;

    #[tokio::test]
    async fn test_only_approved_audit_counts() {
        let pool = create_migrated_test_pool().await.unwrap();
        let school = School::new("Hollybank");
        SqliteSchoolRepository::new(pool.clone()).create(&school).await.unwrap();
        let signals = SqliteSignalRepository::new(pool);

        let mut audit = AuditResponse::new(school.id, AuditStatus::Submitted);
        signals.save_audit(&audit).await.unwrap();
        assert!(!signals.has_approved_audit(school.id).await.unwrap());

        audit.status = AuditStatus::Approved;
        signals.save_audit(&audit).await.unwrap();
        assert!(signals.has_approved_audit(school.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_action_plan_existence() {
        let pool = create_migrated_test_pool().await.unwrap();
        let school = School::new("Hollybank");
        SqliteSchoolRepository::new(pool.clone()).create(&school).await.unwrap();
        let signals = SqliteSignalRepository::new(pool);

        assert!(!signals.has_action_plan(school.id).await.unwrap());
        signals
            .add_reduction_promise(&ReductionPromise::new(school.id, "Refill stations in every block"))
            .await
            .unwrap();
        assert!(signals.has_action_plan(school.id).await.unwrap());
    }
}
