//! Core data models for the journal index.
//!
//! These types represent the entries, chunks, and results that flow through
//! the ingestion, retrieval, and lifecycle pipeline.

use serde::Serialize;

/// One journaled day, as delivered by the upstream OCR step.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Calendar date (`YYYY-MM-DD`), the entry's natural key.
    pub date: String,
    /// Full extracted text. Empty text is rejected before chunking.
    pub text: String,
    /// Word count supplied by the OCR step, not recomputed here.
    pub word_count: i64,
    /// Path of the source text file.
    pub source_file: String,
}

/// Metadata stored alongside every chunk.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkMetadata {
    pub date: String,
    pub chunk_index: i64,
    pub total_chunks: i64,
    pub word_count: i64,
    pub source_file: String,
}

/// The unit actually embedded and searched.
///
/// The id is a pure function of `(date, chunk_index)` — see
/// [`chunk_id`](crate::chunk::chunk_id) — which makes re-ingestion of
/// unchanged entries a no-op on the index.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub id: String,
    pub text: String,
    pub meta: ChunkMetadata,
}

/// A search result returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub date: String,
    pub text: String,
    pub chunk_index: i64,
    /// Lower = more similar. `None` for unranked date-range listings.
    pub distance: Option<f64>,
}

/// A backup snapshot of the whole index directory.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub name: String,
    pub path: std::path::PathBuf,
    pub size_bytes: u64,
    pub created_at: chrono::DateTime<chrono::Local>,
}

/// Aggregate index statistics.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    /// Number of unique entry dates.
    pub total_entries: u64,
    pub total_chunks: u64,
    /// Sum of per-date word counts (each date counted once).
    pub total_words: i64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}

/// One row of the `jrnl list` catalog.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    pub date: String,
    pub chunk_count: u64,
    pub word_count: i64,
}
