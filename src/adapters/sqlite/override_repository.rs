//! SQLite implementation of the admin override ledger.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_datetime, parse_round, parse_stage, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::AdminEvidenceOverride;
use crate::domain::ports::{OverrideRepository, ToggleResult};

const OVERRIDE_COLUMNS: &str =
    "id, school_id, evidence_requirement_id, stage, round_number, marked_by, created_at";

#[derive(Clone)]
pub struct SqliteOverrideRepository {
    pool: SqlitePool,
}

impl SqliteOverrideRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OverrideRepository for SqliteOverrideRepository {
    async fn toggle(&self, candidate: &AdminEvidenceOverride) -> DomainResult<ToggleResult> {
        let mut tx = self.pool.begin().await?;

        // Delete first so the transaction takes the write lock before reading
        let removed: Option<OverrideRow> = sqlx::query_as(&format!(
            "DELETE FROM admin_evidence_overrides
             WHERE school_id = ? AND evidence_requirement_id = ? AND round_number = ?
             RETURNING {OVERRIDE_COLUMNS}"
        ))
        .bind(candidate.school_id.to_string())
        .bind(candidate.evidence_requirement_id.to_string())
        .bind(i64::from(candidate.round_number))
        .fetch_optional(&mut *tx)
        .await?;

        let result = if let Some(row) = removed {
            ToggleResult {
                created: false,
                entry: row.try_into()?,
            }
        } else {
            sqlx::query(&format!(
                "INSERT INTO admin_evidence_overrides ({OVERRIDE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"
            ))
            .bind(candidate.id.to_string())
            .bind(candidate.school_id.to_string())
            .bind(candidate.evidence_requirement_id.to_string())
            .bind(candidate.stage.as_str())
            .bind(i64::from(candidate.round_number))
            .bind(&candidate.marked_by)
            .bind(candidate.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;

            ToggleResult {
                created: true,
                entry: candidate.clone(),
            }
        };

        tx.commit().await?;
        Ok(result)
    }

    async fn list_for_round(&self, school_id: Uuid, round_number: u32) -> DomainResult<Vec<AdminEvidenceOverride>> {
        let rows: Vec<OverrideRow> = sqlx::query_as(&format!(
            "SELECT {OVERRIDE_COLUMNS} FROM admin_evidence_overrides
             WHERE school_id = ? AND round_number = ? ORDER BY created_at"
        ))
        .bind(school_id.to_string())
        .bind(i64::from(round_number))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AdminEvidenceOverride::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct OverrideRow {
    id: String,
    school_id: String,
    evidence_requirement_id: String,
    stage: String,
    round_number: i64,
    marked_by: String,
    created_at: String,
}

impl TryFrom<OverrideRow> for AdminEvidenceOverride {
    type Error = DomainError;

    fn try_from(row: OverrideRow) -> Result<Self, Self::Error> {
        Ok(AdminEvidenceOverride {
            id: parse_uuid(&row.id)?,
            school_id: parse_uuid(&row.school_id)?,
            evidence_requirement_id: parse_uuid(&row.evidence_requirement_id)?,
            stage: parse_stage(&row.stage)?,
            round_number: parse_round(row.round_number)?,
            marked_by: row.marked_by,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteRequirementCatalog, SqliteSchoolRepository};
    use crate::domain::models::{School, Stage};
    use crate::domain::ports::{RequirementCatalog, SchoolRepository};

    #[tokio::test]
    async fn test_toggle_inserts_then_deletes() {
        let pool = create_migrated_test_pool().await.unwrap();
        let school = School::new("Oakfield");
        SqliteSchoolRepository::new(pool.clone()).create(&school).await.unwrap();
        let requirement = SqliteRequirementCatalog::new(pool.clone())
            .list_for_stage(Stage::Inspire)
            .await
            .unwrap()
            .remove(0);
        let repo = SqliteOverrideRepository::new(pool);

        let first = AdminEvidenceOverride::new(school.id, requirement.id, Stage::Inspire, 1, "admin-7");
        let created = repo.toggle(&first).await.unwrap();
        assert!(created.created);
        assert_eq!(repo.list_for_round(school.id, 1).await.unwrap().len(), 1);

        // A fresh candidate with a different id still matches on the tuple
        let second = AdminEvidenceOverride::new(school.id, requirement.id, Stage::Inspire, 1, "admin-8");
        let removed = repo.toggle(&second).await.unwrap();
        assert!(!removed.created);
        assert_eq!(removed.entry.id, first.id);
        assert!(repo.list_for_round(school.id, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overrides_are_per_round() {
        let pool = create_migrated_test_pool().await.unwrap();
        let school = School::new("Oakfield");
        SqliteSchoolRepository::new(pool.clone()).create(&school).await.unwrap();
        let requirement = SqliteRequirementCatalog::new(pool.clone())
            .list_for_stage(Stage::Act)
            .await
            .unwrap()
            .remove(0);
        let repo = SqliteOverrideRepository::new(pool);

        repo.toggle(&AdminEvidenceOverride::new(school.id, requirement.id, Stage::Act, 1, "admin"))
            .await
            .unwrap();
        let round_two = repo
            .toggle(&AdminEvidenceOverride::new(school.id, requirement.id, Stage::Act, 2, "admin"))
            .await
            .unwrap();

        assert!(round_two.created);
        assert_eq!(repo.list_for_round(school.id, 1).await.unwrap().len(), 1);
        assert_eq!(repo.list_for_round(school.id, 2).await.unwrap().len(), 1);
    }
}
