//! SQLite implementation of the CertificateRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_datetime, parse_optional_datetime, parse_round, parse_stage, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Certificate, CertificateMetadata, Stage};
use crate::domain::ports::CertificateRepository;

const CERTIFICATE_COLUMNS: &str =
    "id, school_id, stage, round_number, certificate_number, metadata, issued_at, deleted_at";

#[derive(Clone)]
pub struct SqliteCertificateRepository {
    pool: SqlitePool,
}

impl SqliteCertificateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CertificateRepository for SqliteCertificateRepository {
    async fn insert(&self, certificate: &Certificate) -> DomainResult<()> {
        let metadata_json = serde_json::to_string(&certificate.metadata)?;

        sqlx::query(&format!(
            "INSERT INTO certificates ({CERTIFICATE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(certificate.id.to_string())
        .bind(certificate.school_id.to_string())
        .bind(certificate.stage.as_str())
        .bind(i64::from(certificate.round_number))
        .bind(&certificate.certificate_number)
        .bind(&metadata_json)
        .bind(certificate.issued_at.to_rfc3339())
        .bind(certificate.deleted_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_for_round(
        &self,
        school_id: Uuid,
        stage: Stage,
        round_number: u32,
    ) -> DomainResult<Option<Certificate>> {
        let row: Option<CertificateRow> = sqlx::query_as(&format!(
            "SELECT {CERTIFICATE_COLUMNS} FROM certificates
             WHERE school_id = ? AND stage = ? AND round_number = ?"
        ))
        .bind(school_id.to_string())
        .bind(stage.as_str())
        .bind(i64::from(round_number))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Certificate::try_from).transpose()
    }

    async fn list_for_school(&self, school_id: Uuid) -> DomainResult<Vec<Certificate>> {
        let rows: Vec<CertificateRow> = sqlx::query_as(&format!(
            "SELECT {CERTIFICATE_COLUMNS} FROM certificates WHERE school_id = ? ORDER BY round_number, issued_at"
        ))
        .bind(school_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Certificate::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct CertificateRow {
    id: String,
    school_id: String,
    stage: String,
    round_number: i64,
    certificate_number: String,
    metadata: String,
    issued_at: String,
    deleted_at: Option<String>,
}

impl TryFrom<CertificateRow> for Certificate {
    type Error = DomainError;

    fn try_from(row: CertificateRow) -> Result<Self, Self::Error> {
        let metadata: CertificateMetadata = serde_json::from_str(&row.metadata)?;

        Ok(Certificate {
            id: parse_uuid(&row.id)?,
            school_id: parse_uuid(&row.school_id)?,
            stage: parse_stage(&row.stage)?,
            round_number: parse_round(row.round_number)?,
            certificate_number: row.certificate_number,
            metadata,
            issued_at: parse_datetime(&row.issued_at)?,
            deleted_at: parse_optional_datetime(row.deleted_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteSchoolRepository};
    use crate::domain::models::{AchievementSnapshot, School};
    use crate::domain::ports::SchoolRepository;

    async fn setup() -> (SqliteCertificateRepository, School) {
        let pool = create_migrated_test_pool().await.unwrap();
        let school = School::new("Brookvale");
        SqliteSchoolRepository::new(pool.clone()).create(&school).await.unwrap();
        (SqliteCertificateRepository::new(pool), school)
    }

    #[tokio::test]
    async fn test_insert_and_find_for_round() {
        let (repo, school) = setup().await;
        let cert = Certificate::for_round(school.id, 1, AchievementSnapshot::default());
        repo.insert(&cert).await.unwrap();

        let found = repo.find_for_round(school.id, Stage::Act, 1).await.unwrap().unwrap();
        assert_eq!(found.certificate_number, cert.certificate_number);
        assert_eq!(found.metadata.round_number, 1);
        assert!(repo.find_for_round(school.id, Stage::Act, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_certificate_for_round_violates_constraint() {
        let (repo, school) = setup().await;
        repo.insert(&Certificate::for_round(school.id, 1, AchievementSnapshot::default()))
            .await
            .unwrap();

        let mut duplicate = Certificate::for_round(school.id, 1, AchievementSnapshot::default());
        duplicate.certificate_number = "R1-DIFFERENT".to_string();
        let err = repo.insert(&duplicate).await.unwrap_err();
        assert!(matches!(err, DomainError::ConstraintViolation(_)));

        assert_eq!(repo.list_for_school(school.id).await.unwrap().len(), 1);
    }
}
