//! SQLite database adapters for the Pathway progression core.

pub mod certificate_repository;
pub mod connection;
pub mod evidence_repository;
pub mod migrations;
pub mod override_repository;
pub mod requirement_repository;
pub mod school_repository;
pub mod signal_repository;

pub use certificate_repository::SqliteCertificateRepository;
pub use connection::{create_pool, create_test_pool, database_url, ConnectionError, PoolConfig};
pub use evidence_repository::SqliteEvidenceRepository;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use override_repository::SqliteOverrideRepository;
pub use requirement_repository::SqliteRequirementCatalog;
pub use school_repository::SqliteSchoolRepository;
pub use signal_repository::SqliteSignalRepository;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DatabaseConfig, Stage};

/// Parse a UUID string from a SQLite row field.
pub fn parse_uuid(s: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Parse an optional UUID string from a SQLite row field.
pub fn parse_optional_uuid(s: Option<String>) -> DomainResult<Option<Uuid>> {
    s.map(|s| Uuid::parse_str(&s))
        .transpose()
        .map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an optional RFC3339 datetime string from a SQLite row field.
pub fn parse_optional_datetime(s: Option<String>) -> DomainResult<Option<DateTime<Utc>>> {
    s.map(|s| chrono::DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)))
        .transpose()
        .map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Parse a stage name from a SQLite row field.
pub fn parse_stage(s: &str) -> DomainResult<Stage> {
    Stage::from_str(s).ok_or_else(|| DomainError::SerializationError(format!("Invalid stage: {s}")))
}

/// Convert a stored INTEGER to a round number.
pub fn parse_round(n: i64) -> DomainResult<u32> {
    u32::try_from(n).map_err(|_| DomainError::SerializationError(format!("Invalid round number: {n}")))
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Open a pool and bring the schema up to date.
pub async fn initialize_database(url: &str, config: Option<PoolConfig>) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(url, config).await?;
    Migrator::new(pool.clone()).run(all_embedded_migrations()).await?;
    Ok(pool)
}

/// Open the database a [`DatabaseConfig`] points at.
pub async fn open_database(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    initialize_database(&database_url(&config.path), Some(PoolConfig::from(config))).await
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    Migrator::new(pool.clone()).run(all_embedded_migrations()).await?;
    Ok(pool)
}
