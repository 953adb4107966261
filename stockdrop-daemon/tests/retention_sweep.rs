use std::fs;
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use stockdrop_daemon::{sweep_at, DaemonError};
use tempfile::TempDir;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);
const RETENTION: Duration = Duration::from_secs(15 * 24 * 60 * 60);

fn write_aged(dir: &TempDir, name: &str, age: Duration) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, "sku,qty\n").expect("write file");
    let mtime = FileTime::from_system_time(SystemTime::now() - age);
    set_file_mtime(&path, mtime).expect("set mtime");
    path
}

#[tokio::test]
async fn old_files_are_deleted_and_recent_ones_kept() {
    let dir = TempDir::new().expect("dir");
    let old = write_aged(&dir, "old.csv", 20 * DAY);
    let recent = write_aged(&dir, "recent.csv", DAY);

    let report = sweep_at(dir.path(), RETENTION, SystemTime::now(), false)
        .await
        .expect("sweep");

    assert_eq!(report.examined, 2);
    assert_eq!(report.deleted, vec![old.clone()]);
    assert_eq!(report.failed, 0);
    assert!(!old.exists(), "old file should be deleted");
    assert!(recent.exists(), "recent file should be kept");
}

#[tokio::test]
async fn entry_exactly_at_retention_age_is_kept() {
    let dir = TempDir::new().expect("dir");
    let path = dir.path().join("edge.csv");
    fs::write(&path, "x").expect("write");
    set_file_mtime(&path, FileTime::from_unix_time(1_700_000_000, 0)).expect("set mtime");
    let mtime = fs::metadata(&path).expect("meta").modified().expect("mtime");

    let at_boundary = sweep_at(dir.path(), RETENTION, mtime + RETENTION, false)
        .await
        .expect("sweep");
    assert!(at_boundary.deleted.is_empty(), "boundary entry must survive");
    assert!(path.exists());

    let past_boundary = sweep_at(dir.path(), RETENTION, mtime + RETENTION + Duration::from_secs(1), false)
        .await
        .expect("sweep");
    assert_eq!(past_boundary.deleted, vec![path.clone()]);
    assert!(!path.exists());
}

#[tokio::test]
async fn dry_run_lists_candidates_without_deleting() {
    let dir = TempDir::new().expect("dir");
    let old = write_aged(&dir, "old.csv", 30 * DAY);

    let report = sweep_at(dir.path(), RETENTION, SystemTime::now(), true)
        .await
        .expect("sweep");

    assert_eq!(report.deleted, vec![old.clone()]);
    assert!(old.exists(), "dry run must not delete");
}

#[tokio::test]
async fn failed_delete_does_not_stop_the_sweep() {
    let dir = TempDir::new().expect("dir");
    let nested = dir.path().join("old-dir");
    fs::create_dir(&nested).expect("mkdir");
    set_file_mtime(&nested, FileTime::from_system_time(SystemTime::now() - 40 * DAY))
        .expect("set dir mtime");
    let a = write_aged(&dir, "a.csv", 20 * DAY);
    let b = write_aged(&dir, "b.csv", 25 * DAY);

    let report = sweep_at(dir.path(), RETENTION, SystemTime::now(), false)
        .await
        .expect("sweep");

    assert_eq!(report.examined, 3);
    assert_eq!(report.failed, 1, "removing a directory as a file fails");
    assert_eq!(report.deleted, vec![a.clone(), b.clone()]);
    assert!(nested.exists());
}

#[tokio::test]
async fn missing_directory_is_an_error() {
    let dir = TempDir::new().expect("dir");
    let err = sweep_at(&dir.path().join("absent"), RETENTION, SystemTime::now(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, DaemonError::Io { .. }), "got {err}");
}
