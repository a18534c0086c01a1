//! Short ID prefix resolution for CLI commands.
//!
//! Allows users to specify any unique prefix of a UUID instead of the full
//! 36-char ID, similar to git short hashes.

use anyhow::{bail, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

const SCHOOL_QUERY: &str = "SELECT id FROM schools WHERE id LIKE ?";
const EVIDENCE_QUERY: &str = "SELECT id FROM evidence WHERE id LIKE ?";
const REQUIREMENT_QUERY: &str = "SELECT id FROM evidence_requirements WHERE id LIKE ?";

pub async fn resolve_school_id(pool: &SqlitePool, prefix: &str) -> Result<Uuid> {
    resolve_prefix(pool, prefix, "school", SCHOOL_QUERY).await
}

pub async fn resolve_evidence_id(pool: &SqlitePool, prefix: &str) -> Result<Uuid> {
    resolve_prefix(pool, prefix, "evidence", EVIDENCE_QUERY).await
}

pub async fn resolve_requirement_id(pool: &SqlitePool, prefix: &str) -> Result<Uuid> {
    resolve_prefix(pool, prefix, "requirement", REQUIREMENT_QUERY).await
}

fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        bail!("ID prefix must not be empty");
    }
    if !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        bail!("Invalid ID prefix '{prefix}': must contain only hex characters and dashes");
    }
    Ok(())
}

async fn resolve_prefix(pool: &SqlitePool, prefix: &str, entity: &str, query: &str) -> Result<Uuid> {
    // Fast path: a full UUID needs no lookup
    if let Ok(uuid) = Uuid::parse_str(prefix) {
        return Ok(uuid);
    }

    validate_prefix(prefix)?;

    let pattern = format!("{}%", prefix.to_lowercase());
    let rows: Vec<(String,)> = sqlx::query_as(query).bind(&pattern).fetch_all(pool).await?;

    match rows.as_slice() {
        [] => bail!("No {entity} found matching '{prefix}'"),
        [(id,)] => Ok(Uuid::parse_str(id)?),
        _ => {
            let mut msg = format!("Ambiguous prefix '{prefix}': matches {} {entity} ids:", rows.len());
            for (id,) in &rows {
                msg.push_str("\n  ");
                msg.push_str(id);
            }
            bail!("{msg}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteSchoolRepository};
    use crate::domain::models::School;
    use crate::domain::ports::SchoolRepository;

    #[tokio::test]
    async fn test_resolves_unique_prefix() {
        let pool = create_migrated_test_pool().await.unwrap();
        let school = School::new("Kingsmead");
        SqliteSchoolRepository::new(pool.clone()).create(&school).await.unwrap();

        let prefix = &school.id.to_string()[..8];
        assert_eq!(resolve_school_id(&pool, prefix).await.unwrap(), school.id);
    }

    #[tokio::test]
    async fn test_seeded_requirement_prefix_is_ambiguous() {
        let pool = create_migrated_test_pool().await.unwrap();
        // All three Inspire requirements share this prefix
        let err = resolve_requirement_id(&pool, "11111111").await.unwrap_err();
        assert!(err.to_string().contains("Ambiguous"));
    }

    #[tokio::test]
    async fn test_rejects_non_hex_prefix() {
        let pool = create_migrated_test_pool().await.unwrap();
        assert!(resolve_evidence_id(&pool, "xyz").await.is_err());
    }
}
