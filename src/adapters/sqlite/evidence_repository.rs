//! SQLite implementation of the EvidenceRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_datetime, parse_optional_datetime, parse_optional_uuid, parse_round, parse_stage, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Evidence, EvidenceReview, EvidenceStatus};
use crate::domain::ports::EvidenceRepository;

const EVIDENCE_COLUMNS: &str = "id, school_id, stage, round_number, status, evidence_requirement_id, \
     submitted_by, submitted_at, reviewed_by, reviewed_at, review_notes";

#[derive(Clone)]
pub struct SqliteEvidenceRepository {
    pool: SqlitePool,
}

impl SqliteEvidenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EvidenceRepository for SqliteEvidenceRepository {
    async fn create(&self, evidence: &Evidence) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO evidence (id, school_id, stage, round_number, status, evidence_requirement_id,
               submitted_by, submitted_at, reviewed_by, reviewed_at, review_notes)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(evidence.id.to_string())
        .bind(evidence.school_id.to_string())
        .bind(evidence.stage.as_str())
        .bind(i64::from(evidence.round_number))
        .bind(evidence.status.as_str())
        .bind(evidence.evidence_requirement_id.map(|id| id.to_string()))
        .bind(&evidence.submitted_by)
        .bind(evidence.submitted_at.to_rfc3339())
        .bind(&evidence.reviewed_by)
        .bind(evidence.reviewed_at.map(|t| t.to_rfc3339()))
        .bind(&evidence.review_notes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Evidence>> {
        let row: Option<EvidenceRow> =
            sqlx::query_as(&format!("SELECT {EVIDENCE_COLUMNS} FROM evidence WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Evidence::try_from).transpose()
    }

    async fn list_for_round(&self, school_id: Uuid, round_number: u32) -> DomainResult<Vec<Evidence>> {
        let rows: Vec<EvidenceRow> = sqlx::query_as(&format!(
            "SELECT {EVIDENCE_COLUMNS} FROM evidence WHERE school_id = ? AND round_number = ? ORDER BY submitted_at"
        ))
        .bind(school_id.to_string())
        .bind(i64::from(round_number))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Evidence::try_from).collect()
    }

    async fn list_for_school(&self, school_id: Uuid) -> DomainResult<Vec<Evidence>> {
        let rows: Vec<EvidenceRow> = sqlx::query_as(&format!(
            "SELECT {EVIDENCE_COLUMNS} FROM evidence WHERE school_id = ? ORDER BY round_number DESC, submitted_at DESC"
        ))
        .bind(school_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Evidence::try_from).collect()
    }

    async fn apply_review(&self, id: Uuid, review: &EvidenceReview) -> DomainResult<Evidence> {
        if !EvidenceStatus::Pending.can_transition_to(review.status) {
            return Err(DomainError::ValidationFailed(format!(
                "Evidence can only be reviewed to approved or rejected, not {}",
                review.status.as_str()
            )));
        }

        let result = sqlx::query(
            r#"UPDATE evidence SET status = ?, reviewed_by = ?, reviewed_at = ?, review_notes = ?
               WHERE id = ? AND status = 'pending'"#,
        )
        .bind(review.status.as_str())
        .bind(&review.reviewer_id)
        .bind(review.reviewed_at.to_rfc3339())
        .bind(&review.notes)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        let current = self.get(id).await?.ok_or(DomainError::EvidenceNotFound(id))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::InvalidState(format!(
                "Evidence {id} is already {}",
                current.status.as_str()
            )));
        }

        Ok(current)
    }
}

#[derive(sqlx::FromRow)]
struct EvidenceRow {
    id: String,
    school_id: String,
    stage: String,
    round_number: i64,
    status: String,
    evidence_requirement_id: Option<String>,
    submitted_by: Option<String>,
    submitted_at: String,
    reviewed_by: Option<String>,
    reviewed_at: Option<String>,
    review_notes: Option<String>,
}

impl TryFrom<EvidenceRow> for Evidence {
    type Error = DomainError;

    fn try_from(row: EvidenceRow) -> Result<Self, Self::Error> {
        let status = EvidenceStatus::from_str(&row.status)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid status: {}", row.status)))?;

        Ok(Evidence {
            id: parse_uuid(&row.id)?,
            school_id: parse_uuid(&row.school_id)?,
            stage: parse_stage(&row.stage)?,
            round_number: parse_round(row.round_number)?,
            status,
            evidence_requirement_id: parse_optional_uuid(row.evidence_requirement_id)?,
            submitted_by: row.submitted_by,
            submitted_at: parse_datetime(&row.submitted_at)?,
            reviewed_by: row.reviewed_by,
            reviewed_at: parse_optional_datetime(row.reviewed_at)?,
            review_notes: row.review_notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteSchoolRepository};
    use crate::domain::models::{School, Stage};
    use crate::domain::ports::SchoolRepository;
    use chrono::Utc;

    async fn setup() -> (SqliteEvidenceRepository, School) {
        let pool = create_migrated_test_pool().await.unwrap();
        let school = School::new("Meadow Lane");
        SqliteSchoolRepository::new(pool.clone()).create(&school).await.unwrap();
        (SqliteEvidenceRepository::new(pool), school)
    }

    fn review(status: EvidenceStatus) -> EvidenceReview {
        EvidenceReview {
            status,
            reviewer_id: "reviewer-1".to_string(),
            notes: Some("looks good".to_string()),
            reviewed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_list_for_round_filters_by_round() {
        let (repo, school) = setup().await;
        repo.create(&Evidence::new(school.id, Stage::Inspire, 1)).await.unwrap();
        repo.create(&Evidence::new(school.id, Stage::Inspire, 1)).await.unwrap();
        repo.create(&Evidence::new(school.id, Stage::Inspire, 2)).await.unwrap();

        assert_eq!(repo.list_for_round(school.id, 1).await.unwrap().len(), 2);
        assert_eq!(repo.list_for_round(school.id, 2).await.unwrap().len(), 1);
        assert_eq!(repo.list_for_school(school.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_review_applies_once() {
        let (repo, school) = setup().await;
        let evidence = Evidence::new(school.id, Stage::Act, 1);
        repo.create(&evidence).await.unwrap();

        let approved = repo.apply_review(evidence.id, &review(EvidenceStatus::Approved)).await.unwrap();
        assert_eq!(approved.status, EvidenceStatus::Approved);
        assert_eq!(approved.reviewed_by.as_deref(), Some("reviewer-1"));
        assert!(approved.reviewed_at.is_some());

        let err = repo.apply_review(evidence.id, &review(EvidenceStatus::Rejected)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));

        let stored = repo.get(evidence.id).await.unwrap().unwrap();
        assert_eq!(stored.status, EvidenceStatus::Approved);
    }

    #[tokio::test]
    async fn test_review_unknown_evidence() {
        let (repo, _) = setup().await;
        let err = repo.apply_review(Uuid::new_v4(), &review(EvidenceStatus::Approved)).await.unwrap_err();
        assert!(matches!(err, DomainError::EvidenceNotFound(_)));
    }

    #[tokio::test]
    async fn test_review_to_pending_rejected() {
        let (repo, school) = setup().await;
        let evidence = Evidence::new(school.id, Stage::Act, 1);
        repo.create(&evidence).await.unwrap();

        let err = repo.apply_review(evidence.id, &review(EvidenceStatus::Pending)).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }
}
