//! Ingestion pipeline orchestration.
//!
//! Coordinates the full flow: OCR output directory → entries → chunking →
//! dedup check → embed + store. Re-running over the same source directory
//! is idempotent: chunk ids are deterministic, so already-indexed chunks
//! are skipped and the index is left unchanged.
//!
//! The run is fault-tolerant — a single unreadable file, missing metadata
//! sidecar, or storage failure is logged and skipped without aborting the
//! batch. Only a missing `text/` or `metadata/` directory is fatal.

use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::chunk::{chunk_id, chunk_text};
use crate::config::Config;
use crate::models::{ChunkMetadata, ChunkRecord, Entry};
use crate::store::VectorStore;

/// Outcome of one ingestion run.
#[derive(Debug, Default, Clone)]
pub struct IngestReport {
    /// Entries fully processed (newly added or already present).
    pub entries: usize,
    pub chunks_added: usize,
    pub chunks_skipped: usize,
}

/// Metadata sidecar written by the OCR step for each text file.
#[derive(Debug, Deserialize)]
struct EntrySidecar {
    entry_date: String,
    word_count: i64,
}

/// Read `(date, text, word_count)` entries from an OCR output directory:
/// `<source>/text/*.txt` paired with `<source>/metadata/<stem>.json`.
///
/// A text file without a metadata sidecar (or with unparseable JSON) is
/// skipped with a warning. A missing subdirectory aborts the run.
pub fn load_entries(source: &Path) -> Result<Vec<Entry>> {
    let text_dir = source.join("text");
    let metadata_dir = source.join("metadata");

    if !text_dir.is_dir() || !metadata_dir.is_dir() {
        bail!(
            "OCR output directory not found or incomplete: {}",
            source.display()
        );
    }

    let mut text_files: Vec<_> = std::fs::read_dir(&text_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    text_files.sort();

    let mut entries = Vec::new();

    for text_file in &text_files {
        let stem = match text_file.file_stem() {
            Some(s) => s.to_string_lossy().to_string(),
            None => continue,
        };
        let sidecar_path = metadata_dir.join(format!("{}.json", stem));

        if !sidecar_path.exists() {
            warn!(file = %text_file.display(), "skipping entry: no metadata sidecar");
            continue;
        }

        let text = match std::fs::read_to_string(text_file) {
            Ok(t) => t.trim().to_string(),
            Err(e) => {
                warn!(file = %text_file.display(), error = %e, "skipping entry: unreadable text");
                continue;
            }
        };

        let sidecar: EntrySidecar = match std::fs::read_to_string(&sidecar_path)
            .map_err(anyhow::Error::from)
            .and_then(|s| serde_json::from_str(&s).map_err(anyhow::Error::from))
        {
            Ok(m) => m,
            Err(e) => {
                warn!(file = %sidecar_path.display(), error = %e, "skipping entry: bad metadata");
                continue;
            }
        };

        entries.push(Entry {
            date: sidecar.entry_date,
            text,
            word_count: sidecar.word_count,
            source_file: text_file.display().to_string(),
        });
    }

    Ok(entries)
}

/// Ingest a batch of entries into the index.
///
/// Entries with empty text are rejected (logged, not fatal). Per-entry
/// storage failures are likewise logged and do not stop the batch. The
/// returned report counts an entry once all its chunks were processed,
/// whether newly added or skipped as duplicates.
pub async fn ingest(
    store: &dyn VectorStore,
    entries: &[Entry],
    chunk_size: usize,
    overlap: usize,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for entry in entries {
        if entry.text.trim().is_empty() {
            warn!(date = %entry.date, "skipping entry: empty text");
            continue;
        }

        match ingest_entry(store, entry, chunk_size, overlap).await {
            Ok((added, skipped)) => {
                report.entries += 1;
                report.chunks_added += added;
                report.chunks_skipped += skipped;
            }
            Err(e) => {
                warn!(date = %entry.date, error = %e, "entry failed, continuing batch");
            }
        }
    }

    Ok(report)
}

async fn ingest_entry(
    store: &dyn VectorStore,
    entry: &Entry,
    chunk_size: usize,
    overlap: usize,
) -> Result<(usize, usize)> {
    let chunks = chunk_text(&entry.text, chunk_size, overlap);
    let total_chunks = chunks.len() as i64;

    let mut added = 0;
    let mut skipped = 0;

    for (i, chunk) in chunks.iter().enumerate() {
        let id = chunk_id(&entry.date, i);
        if store.contains(&id).await? {
            skipped += 1;
            continue;
        }
        let record = ChunkRecord {
            id,
            text: chunk.clone(),
            meta: ChunkMetadata {
                date: entry.date.clone(),
                chunk_index: i as i64,
                total_chunks,
                word_count: entry.word_count,
                source_file: entry.source_file.clone(),
            },
        };
        store.add(&record).await?;
        added += 1;
    }

    Ok((added, skipped))
}

/// CLI entry point: load a source directory, ingest it, print a summary.
pub async fn run_ingest(
    config: &Config,
    store: &dyn VectorStore,
    source: &Path,
) -> Result<()> {
    let entries = load_entries(source)?;
    if entries.is_empty() {
        println!("No entries found to ingest.");
        return Ok(());
    }

    println!("Ingesting {} entries from {}", entries.len(), source.display());

    let report = ingest(
        store,
        &entries,
        config.chunking.chunk_size,
        config.chunking.overlap,
    )
    .await?;

    println!("Ingested {} entries", report.entries);
    println!("  chunks added:   {}", report.chunks_added);
    println!("  chunks skipped: {}", report.chunks_skipped);
    println!("  total chunks in index: {}", store.count().await?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::store::sqlite::SqliteStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn entry(date: &str, text: &str, word_count: i64) -> Entry {
        Entry {
            date: date.to_string(),
            text: text.to_string(),
            word_count,
            source_file: format!("/scans/{}.txt", date),
        }
    }

    async fn open_store(tmp: &TempDir) -> SqliteStore {
        SqliteStore::open(&tmp.path().join("vector_db"), Arc::new(HashingEmbedder::new(64)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_single_short_entry_one_chunk() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let entries = vec![entry(
            "2025-02-01",
            "I went hiking in the mountains today and saw beautiful scenery.",
            11,
        )];
        let report = ingest(&store, &entries, 500, 50).await.unwrap();

        assert_eq!(report.entries, 1);
        assert_eq!(report.chunks_added, 1);
        assert!(store.contains("2025-02-01_chunk_0").await.unwrap());
    }

    #[tokio::test]
    async fn test_ingest_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let long_text = "word ".repeat(200); // 1000 chars -> multiple chunks
        let entries = vec![
            entry("2025-02-01", &long_text, 200),
            entry("2025-02-02", "A short entry.", 3),
        ];

        let first = ingest(&store, &entries, 100, 10).await.unwrap();
        let count_after_first = store.count().await.unwrap();
        assert!(first.chunks_added > 2);

        let second = ingest(&store, &entries, 100, 10).await.unwrap();
        assert_eq!(second.entries, 2);
        assert_eq!(second.chunks_added, 0);
        assert_eq!(second.chunks_skipped, first.chunks_added);
        assert_eq!(store.count().await.unwrap(), count_after_first);
    }

    #[tokio::test]
    async fn test_chunk_metadata_contiguous() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let long_text = "word ".repeat(200);
        ingest(&store, &[entry("2025-03-01", &long_text, 200)], 100, 10)
            .await
            .unwrap();

        let mut records = store.get(None, None).await.unwrap();
        records.sort_by_key(|r| r.meta.chunk_index);

        let n = records.len() as i64;
        assert!(n > 1);
        for (i, rec) in records.iter().enumerate() {
            assert_eq!(rec.meta.chunk_index, i as i64);
            assert_eq!(rec.meta.total_chunks, n);
            assert!(!rec.text.is_empty());
        }
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let report = ingest(&store, &[entry("2025-02-01", "   ", 0)], 500, 50)
            .await
            .unwrap();
        assert_eq!(report.entries, 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_load_entries_from_directory() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("ocr_output");
        std::fs::create_dir_all(source.join("text")).unwrap();
        std::fs::create_dir_all(source.join("metadata")).unwrap();

        std::fs::write(source.join("text/day1.txt"), "Went for a long walk.").unwrap();
        std::fs::write(
            source.join("metadata/day1.json"),
            r#"{"entry_date": "2025-01-05", "word_count": 5}"#,
        )
        .unwrap();

        // No sidecar: skipped with a warning.
        std::fs::write(source.join("text/orphan.txt"), "No metadata here.").unwrap();

        // Bad JSON: skipped with a warning.
        std::fs::write(source.join("text/day2.txt"), "Another day.").unwrap();
        std::fs::write(source.join("metadata/day2.json"), "{not json").unwrap();

        let entries = load_entries(&source).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].date, "2025-01-05");
        assert_eq!(entries[0].word_count, 5);
    }

    #[tokio::test]
    async fn test_load_entries_missing_directory_is_fatal() {
        let tmp = TempDir::new().unwrap();
        assert!(load_entries(&tmp.path().join("nope")).is_err());
    }
}
