//! Error types at the storage and backup boundaries.
//!
//! Application code propagates these through `anyhow`; the enums exist so
//! callers can distinguish duplicates and missing snapshots from genuine
//! storage failures.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the vector index adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record id already exists. Callers are expected to check with
    /// `contains` first; hitting this means the dedup check was skipped.
    #[error("record already exists: {0}")]
    Duplicate(String),

    /// The embedding collaborator failed to produce a vector.
    #[error("embedding failed: {0}")]
    Embedding(anyhow::Error),

    #[error("storage failure: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised by the backup/retention manager.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The referenced path is not an existing snapshot directory.
    #[error("backup not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
