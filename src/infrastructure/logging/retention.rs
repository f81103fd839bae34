//! Cleanup of rolled log files past the retention period.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::path::Path;
use tracing::{info, warn};

use super::logger::LOG_FILE_NAME;

/// Delete rolled log files in `log_dir` not modified for `retention_days`.
///
/// Only files named after the rolling appender's base name are touched.
/// Returns the number of files removed.
pub async fn prune_expired_logs(log_dir: impl AsRef<Path>, retention_days: u32) -> Result<usize> {
    let log_dir = log_dir.as_ref();

    if !log_dir.exists() {
        warn!(path = %log_dir.display(), "log directory does not exist");
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
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_NAME));
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
            info!(path = %path.display(), "deleted expired log file");
            deleted_count += 1;
        }
    }

    Ok(deleted_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_directory_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(prune_expired_logs(&missing, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zero_retention_removes_only_log_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("dotoday.log.2024-01-01"), "old").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        // Ensure the log file's mtime is strictly before the cutoff.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let removed = prune_expired_logs(dir.path(), 0).await.unwrap();
        assert_eq!(removed, 1);
        assert!(dir.path().join("notes.txt").exists());
        assert!(!dir.path().join("dotoday.log.2024-01-01").exists());
    }

    #[tokio::test]
    async fn test_recent_files_are_kept() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("dotoday.log"), "fresh").unwrap();

        assert_eq!(prune_expired_logs(dir.path(), 30).await.unwrap(), 0);
        assert!(dir.path().join("dotoday.log").exists());
    }
}
