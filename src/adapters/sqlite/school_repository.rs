//! SQLite implementation of the SchoolRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_datetime, parse_round, parse_stage, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::School;
use crate::domain::ports::SchoolRepository;

const SCHOOL_COLUMNS: &str = "id, name, contact_email, current_stage, current_round, \
     inspire_completed, investigate_completed, act_completed, award_completed, \
     audit_quiz_completed, progress_percentage, rounds_completed, version, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteSchoolRepository {
    pool: SqlitePool,
}

impl SqliteSchoolRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchoolRepository for SqliteSchoolRepository {
    async fn create(&self, school: &School) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO schools (id, name, contact_email, current_stage, current_round,
               inspire_completed, investigate_completed, act_completed, award_completed,
               audit_quiz_completed, progress_percentage, rounds_completed, version, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(school.id.to_string())
        .bind(&school.name)
        .bind(&school.contact_email)
        .bind(school.current_stage.as_str())
        .bind(i64::from(school.current_round))
        .bind(school.inspire_completed)
        .bind(school.investigate_completed)
        .bind(school.act_completed)
        .bind(school.award_completed)
        .bind(school.audit_quiz_completed)
        .bind(i64::from(school.progress_percentage))
        .bind(i64::from(school.rounds_completed))
        .bind(school.version)
        .bind(school.created_at.to_rfc3339())
        .bind(school.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<School>> {
        let row: Option<SchoolRow> = sqlx::query_as(&format!("SELECT {SCHOOL_COLUMNS} FROM schools WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(School::try_from).transpose()
    }

    async fn list(&self) -> DomainResult<Vec<School>> {
        let rows: Vec<SchoolRow> =
            sqlx::query_as(&format!("SELECT {SCHOOL_COLUMNS} FROM schools ORDER BY created_at, id"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(School::try_from).collect()
    }

    async fn update_progress(&self, school: &School) -> DomainResult<School> {
        let new_version = school.version + 1;
        let updated_at = Utc::now();

        let result = sqlx::query(
            r#"UPDATE schools SET
                current_stage = ?,
                current_round = ?,
                inspire_completed = ?,
                investigate_completed = ?,
                act_completed = ?,
                award_completed = ?,
                audit_quiz_completed = ?,
                progress_percentage = ?,
                rounds_completed = ?,
                updated_at = ?,
                version = ?
            WHERE id = ? AND version = ?"#,
        )
        .bind(school.current_stage.as_str())
        .bind(i64::from(school.current_round))
        .bind(school.inspire_completed)
        .bind(school.investigate_completed)
        .bind(school.act_completed)
        .bind(school.award_completed)
        .bind(school.audit_quiz_completed)
        .bind(i64::from(school.progress_percentage))
        .bind(i64::from(school.rounds_completed))
        .bind(updated_at.to_rfc3339())
        .bind(new_version)
        .bind(school.id.to_string())
        .bind(school.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish a missing row from a lost race
            return match self.get(school.id).await? {
                Some(_) => Err(DomainError::ConcurrencyConflict {
                    entity: "school".to_string(),
                    id: school.id.to_string(),
                }),
                None => Err(DomainError::SchoolNotFound(school.id)),
            };
        }

        let mut stored = school.clone();
        stored.version = new_version;
        stored.updated_at = updated_at;
        Ok(stored)
    }
}

#[derive(sqlx::FromRow)]
struct SchoolRow {
    id: String,
    name: String,
    contact_email: Option<String>,
    current_stage: String,
    current_round: i64,
    inspire_completed: bool,
    investigate_completed: bool,
    act_completed: bool,
    award_completed: bool,
    audit_quiz_completed: bool,
    progress_percentage: i64,
    rounds_completed: i64,
    version: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<SchoolRow> for School {
    type Error = DomainError;

    fn try_from(row: SchoolRow) -> Result<Self, Self::Error> {
        let progress_percentage = u8::try_from(row.progress_percentage).map_err(|_| {
            DomainError::SerializationError(format!("Invalid progress: {}", row.progress_percentage))
        })?;

        Ok(School {
            id: parse_uuid(&row.id)?,
            name: row.name,
            contact_email: row.contact_email,
            current_stage: parse_stage(&row.current_stage)?,
            current_round: parse_round(row.current_round)?,
            inspire_completed: row.inspire_completed,
            investigate_completed: row.investigate_completed,
            act_completed: row.act_completed,
            award_completed: row.award_completed,
            audit_quiz_completed: row.audit_quiz_completed,
            progress_percentage,
            rounds_completed: parse_round(row.rounds_completed)?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
            version: row.version,
        })
    }
}
