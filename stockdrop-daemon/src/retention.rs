//! Age-based eviction of files in the watched directory.
//!
//! An entry is deleted when `now - mtime > retention` (strictly greater).
//! Per-entry stat or delete failures are logged and counted; they never stop
//! the rest of the sweep.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::{io_err, DaemonError};

/// What one sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub examined: usize,
    /// Deleted entries, or deletion candidates on a dry run.
    pub deleted: Vec<PathBuf>,
    pub failed: usize,
}

/// True when `modified` is older than `retention` at `now`. Modification
/// times in the future are never expired.
pub fn is_expired(modified: SystemTime, now: SystemTime, retention: Duration) -> bool {
    now.duration_since(modified)
        .map(|age| age > retention)
        .unwrap_or(false)
}

/// Sweep `dir` once.
///
/// # Errors
/// Only a failure to list `dir` itself is returned.
pub async fn sweep_at(
    dir: &Path,
    retention: Duration,
    now: SystemTime,
    dry_run: bool,
) -> Result<SweepReport, DaemonError> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| io_err(dir, e))?;
    let mut report = SweepReport::default();

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                tracing::error!(path = %dir.display(), error = %err, "error reading directory during cleanup");
                report.failed += 1;
                break;
            }
        };
        report.examined += 1;
        let path = entry.path();

        let modified = match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "error getting stats for file");
                report.failed += 1;
                continue;
            }
        };
        if !is_expired(modified, now, retention) {
            continue;
        }

        if dry_run {
            report.deleted.push(path);
            continue;
        }
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "deleted old file");
                report.deleted.push(path);
            }
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "error deleting old file");
                report.failed += 1;
            }
        }
    }

    report.deleted.sort();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn boundary_age_is_not_expired() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000 * 86_400);
        let retention = 15 * DAY;
        assert!(!is_expired(now - retention, now, retention));
        assert!(is_expired(now - retention - Duration::from_millis(1), now, retention));
        assert!(!is_expired(now - DAY, now, retention));
    }

    #[test]
    fn future_mtime_is_not_expired() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000 * 86_400);
        assert!(!is_expired(now + DAY, now, DAY));
    }
}
