//! Backup snapshots and retention pruning.
//!
//! A snapshot is a whole-directory copy of the index, placed in the
//! sibling `<index>_backups/` directory under a timestamped, reason-tagged
//! name. Snapshots are created before every destructive operation and on
//! explicit request; retention keeps the newest `max_backups` and removes
//! the rest, oldest first.
//!
//! Copies and restores are blocking filesystem operations with no
//! partial-failure recovery — an interrupted copy leaves the destination
//! invalid. Restore swaps via a temp directory and rename to keep that
//! window small.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

use crate::error::BackupError;
use crate::models::BackupInfo;

/// Sibling directory holding all snapshots for an index.
pub fn backups_dir(index_path: &Path) -> PathBuf {
    let name = index_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "index".to_string());
    match index_path.parent() {
        Some(parent) => parent.join(format!("{}_backups", name)),
        None => PathBuf::from(format!("{}_backups", name)),
    }
}

/// Copy the index directory into a new timestamped snapshot, then prune
/// to at most `max_backups` snapshots.
///
/// Snapshot names carry millisecond precision; a same-millisecond
/// collision falls back to a numeric suffix, so sequential snapshots
/// always get distinct directories.
pub fn snapshot(index_path: &Path, reason: &str, max_backups: usize) -> Result<PathBuf, BackupError> {
    if !index_path.is_dir() {
        return Err(BackupError::NotFound(index_path.to_path_buf()));
    }

    let dir = backups_dir(index_path);
    std::fs::create_dir_all(&dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
    let base = format!("backup_{}_{}", timestamp, reason);

    let mut dest = dir.join(&base);
    let mut n = 1;
    while dest.exists() {
        dest = dir.join(format!("{}-{}", base, n));
        n += 1;
    }

    copy_dir(index_path, &dest)?;
    info!(backup = %dest.display(), reason, "snapshot created");

    prune(&dir, max_backups)?;

    Ok(dest)
}

/// List snapshots, most recent first.
pub fn list_backups(index_path: &Path) -> Result<Vec<BackupInfo>, BackupError> {
    let dir = backups_dir(index_path);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut backups: Vec<BackupInfo> = std::fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_dir()
                && p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with("backup_"))
        })
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            BackupInfo {
                created_at: dir_created_at(&path),
                size_bytes: dir_size(&path),
                name,
                path,
            }
        })
        .collect();

    // Newest first; name (which embeds the timestamp) breaks mtime ties.
    backups.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.name.cmp(&a.name))
    });

    Ok(backups)
}

/// Replace the live index with a copy of the snapshot at `backup_path`.
///
/// Fails with [`BackupError::NotFound`] unless the path is an existing
/// `backup_*` directory. The live state is discarded without a safety
/// copy; the caller must reopen its store against the restored directory.
pub fn restore(index_path: &Path, backup_path: &Path) -> Result<(), BackupError> {
    let is_snapshot = backup_path.is_dir()
        && backup_path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with("backup_"));
    if !is_snapshot {
        return Err(BackupError::NotFound(backup_path.to_path_buf()));
    }

    // Stage the copy next to the live index, then swap.
    let staging = index_path.with_extension("restore-tmp");
    if staging.exists() {
        std::fs::remove_dir_all(&staging)?;
    }
    copy_dir(backup_path, &staging)?;

    if index_path.exists() {
        std::fs::remove_dir_all(index_path)?;
    }
    std::fs::rename(&staging, index_path)?;

    info!(backup = %backup_path.display(), "index restored from snapshot");
    Ok(())
}

fn prune(dir: &Path, max_backups: usize) -> Result<(), BackupError> {
    let mut backups: Vec<(DateTime<Local>, String, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_dir()
                && p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with("backup_"))
        })
        .map(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            (dir_created_at(&p), name, p)
        })
        .collect();

    // Oldest first.
    backups.sort();

    while backups.len() > max_backups {
        let (_, name, path) = backups.remove(0);
        std::fs::remove_dir_all(&path)?;
        info!(backup = %name, "removed old backup");
    }

    Ok(())
}

fn dir_created_at(path: &Path) -> DateTime<Local> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now())
}

fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

fn copy_dir(src: &Path, dest: &Path) -> Result<(), BackupError> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| {
            BackupError::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::Other, "walkdir error")
            }))
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .unwrap_or_else(|_| entry.path());
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// CLI entry point: print available backups, newest first.
pub fn run_backups(index_path: &Path) -> anyhow::Result<()> {
    let backups = list_backups(index_path)?;
    if backups.is_empty() {
        println!("No backups found.");
        return Ok(());
    }

    println!("Available backups ({}):", backups.len());
    println!();
    for b in &backups {
        println!(
            "  {}  ({})  {}",
            b.name,
            crate::stats::format_bytes(b.size_bytes),
            b.created_at.format("%Y-%m-%d %H:%M:%S")
        );
        println!("    {}", b.path.display());
    }
    println!();
    Ok(())
}
