//! Log retention: deletes rolled log files older than the configured window.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::path::Path;
use tracing::{debug, info};

/// Prefix shared by every file the rolling appender writes.
const LOG_FILE_PREFIX: &str = "pathway.log";

/// Delete `pathway.log*` files in `log_dir` last modified more than
/// `retention_days` ago. Returns the number of files removed.
pub async fn prune_expired_logs(log_dir: impl AsRef<Path>, retention_days: u32) -> Result<usize> {
    let log_dir = log_dir.as_ref();
    if !log_dir.exists() {
        debug!(path = %log_dir.display(), "log directory does not exist yet");
        return Ok(0);
    }

    let cutoff = Utc::now() - Duration::days(i64::from(retention_days));
    let mut deleted_count = 0;

    let mut entries = tokio::fs::read_dir(log_dir)
        .await
        .context("failed to read log directory")?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .context("failed to read directory entry")?
    {
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
        if !is_log {
            continue;
        }

        let modified: DateTime<Utc> = entry
            .metadata()
            .await
            .context("failed to get file metadata")?
            .modified()
            .context("failed to get file modification time")?
            .into();

        if modified < cutoff {
            tokio::fs::remove_file(&path)
                .await
                .context("failed to delete old log file")?;
            debug!(path = %path.display(), "deleted expired log file");
            deleted_count += 1;
        }
    }

    if deleted_count > 0 {
        info!(count = deleted_count, "pruned expired log files");
    }
    Ok(deleted_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_zero_retention_prunes_only_log_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("pathway.log.2026-01-01"), b"old").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), b"keep").unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let deleted = prune_expired_logs(temp_dir.path(), 0).await.unwrap();

        assert_eq!(deleted, 1);
        assert!(temp_dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_recent_files_are_kept() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("pathway.log.2026-10-16"), b"today").unwrap();

        assert_eq!(prune_expired_logs(temp_dir.path(), 30).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_directory_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent");
        assert_eq!(prune_expired_logs(&missing, 7).await.unwrap(), 0);
    }
}
