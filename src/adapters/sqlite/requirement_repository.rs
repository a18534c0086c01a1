//! SQLite-backed requirement catalog.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_stage, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Requirement, Stage};
use crate::domain::ports::RequirementCatalog;

const STAGE_ORDER: &str = "CASE stage WHEN 'inspire' THEN 1 WHEN 'investigate' THEN 2 ELSE 3 END";

#[derive(Clone)]
pub struct SqliteRequirementCatalog {
    pool: SqlitePool,
}

impl SqliteRequirementCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a requirement to the catalog. Catalog maintenance lives outside the
    /// progression core; this exists for seeding and tests.
    pub async fn insert(&self, requirement: &Requirement) -> DomainResult<()> {
        sqlx::query("INSERT INTO evidence_requirements (id, stage, title, order_index) VALUES (?, ?, ?, ?)")
            .bind(requirement.id.to_string())
            .bind(requirement.stage.as_str())
            .bind(&requirement.title)
            .bind(i64::from(requirement.order_index))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RequirementCatalog for SqliteRequirementCatalog {
    async fn list_all(&self) -> DomainResult<Vec<Requirement>> {
        let rows: Vec<RequirementRow> = sqlx::query_as(&format!(
            "SELECT id, stage, title, order_index FROM evidence_requirements ORDER BY {STAGE_ORDER}, order_index"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Requirement::try_from).collect()
    }

    async fn list_for_stage(&self, stage: Stage) -> DomainResult<Vec<Requirement>> {
        let rows: Vec<RequirementRow> = sqlx::query_as(
            "SELECT id, stage, title, order_index FROM evidence_requirements WHERE stage = ? ORDER BY order_index",
        )
        .bind(stage.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Requirement::try_from).collect()
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Requirement>> {
        let row: Option<RequirementRow> =
            sqlx::query_as("SELECT id, stage, title, order_index FROM evidence_requirements WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Requirement::try_from).transpose()
    }
}

#[derive(sqlx::FromRow)]
struct RequirementRow {
    id: String,
    stage: String,
    title: String,
    order_index: i64,
}

impl TryFrom<RequirementRow> for Requirement {
    type Error = DomainError;

    fn try_from(row: RequirementRow) -> Result<Self, Self::Error> {
        let order_index = u32::try_from(row.order_index)
            .map_err(|_| DomainError::SerializationError(format!("Invalid order index: {}", row.order_index)))?;

        Ok(Requirement {
            id: parse_uuid(&row.id)?,
            stage: parse_stage(&row.stage)?,
            title: row.title,
            order_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    #[tokio::test]
    async fn test_seeded_catalog_in_programme_order() {
        let catalog = SqliteRequirementCatalog::new(create_migrated_test_pool().await.unwrap());

        let all = catalog.list_all().await.unwrap();
        let stages: Vec<Stage> = all.iter().map(|r| r.stage).collect();
        assert_eq!(
            stages,
            vec![
                Stage::Inspire,
                Stage::Inspire,
                Stage::Inspire,
                Stage::Investigate,
                Stage::Investigate,
                Stage::Act,
                Stage::Act,
                Stage::Act
            ]
        );

        let investigate = catalog.list_for_stage(Stage::Investigate).await.unwrap();
        assert_eq!(investigate.len(), 2);
        assert_eq!(investigate[0].order_index, 1);
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let catalog = SqliteRequirementCatalog::new(create_migrated_test_pool().await.unwrap());
        let requirement = Requirement::new(Stage::Act, "Host a swap shop", 4);
        catalog.insert(&requirement).await.unwrap();

        let fetched = catalog.get(requirement.id).await.unwrap().unwrap();
        assert_eq!(fetched, requirement);
        assert!(catalog.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
