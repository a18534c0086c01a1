//! CLI command implementations.

pub mod certificate;
pub mod evidence;
pub mod init;
pub mod override_cmd;
pub mod reconcile;
pub mod round;
pub mod school;

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::adapters::notify::{LogNotifier, WebhookNotifier};
use crate::adapters::sqlite::open_database;
use crate::domain::models::{Config, Stage};
use crate::domain::ports::Notifier;
use crate::services::ProgressionService;

/// Open the configured database and build the service over it.
pub async fn open_service(config: &Config) -> Result<(ProgressionService, SqlitePool)> {
    let pool = open_database(&config.database)
        .await
        .context("Failed to initialize database. Run 'pathway init' first.")?;

    let service = ProgressionService::from_sqlite(pool.clone(), config, build_notifier(config)?);
    Ok((service, pool))
}

/// Webhook delivery when a URL is configured, log-only otherwise.
pub fn build_notifier(config: &Config) -> Result<Arc<dyn Notifier>> {
    match &config.notifications.webhook_url {
        Some(url) => {
            let notifier = WebhookNotifier::new(url.clone()).context("Failed to build webhook notifier")?;
            Ok(Arc::new(notifier))
        }
        None => Ok(Arc::new(LogNotifier)),
    }
}

/// clap value parser for stage names.
pub fn parse_stage(s: &str) -> std::result::Result<Stage, String> {
    Stage::from_str(s).ok_or_else(|| format!("unknown stage '{s}' (expected inspire, investigate or act)"))
}
