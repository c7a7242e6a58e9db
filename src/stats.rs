//! Index summaries: per-index totals, per-entry listings, and the
//! date inventory. All derived from chunk metadata, aggregated in Rust
//! over a full fetch — journal indexes are small enough that this beats
//! maintaining summary tables.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::models::{EntrySummary, IndexStats};
use crate::store::VectorStore;

/// Aggregate totals across the whole index.
///
/// Every chunk of an entry carries that entry's full word count, so words
/// are counted once per unique date, not once per chunk.
pub async fn get_stats(store: &dyn VectorStore) -> Result<IndexStats> {
    let records = store.get(None, None).await?;

    let mut words_by_date: BTreeMap<String, i64> = BTreeMap::new();
    for record in &records {
        words_by_date
            .entry(record.meta.date.clone())
            .or_insert(record.meta.word_count);
    }

    Ok(IndexStats {
        total_entries: words_by_date.len() as u64,
        total_chunks: records.len() as u64,
        total_words: words_by_date.values().sum(),
        first_date: words_by_date.keys().next().cloned(),
        last_date: words_by_date.keys().next_back().cloned(),
    })
}

/// One summary row per entry, ascending by date. ISO dates sort
/// lexicographically, so the BTreeMap ordering is chronological.
pub async fn list_all_entries(store: &dyn VectorStore) -> Result<Vec<EntrySummary>> {
    let records = store.get(None, None).await?;

    let mut by_date: BTreeMap<String, EntrySummary> = BTreeMap::new();
    for record in &records {
        by_date
            .entry(record.meta.date.clone())
            .and_modify(|s| s.chunk_count += 1)
            .or_insert_with(|| EntrySummary {
                date: record.meta.date.clone(),
                chunk_count: 1,
                word_count: record.meta.word_count,
            });
    }

    Ok(by_date.into_values().collect())
}

/// Sorted unique dates present in the index.
pub async fn get_all_dates(store: &dyn VectorStore) -> Result<Vec<String>> {
    Ok(list_all_entries(store).await?.into_iter().map(|s| s.date).collect())
}

/// Human-readable byte size, matching `ls -lh` style units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

pub async fn run_stats(store: &dyn VectorStore) -> Result<()> {
    let stats = get_stats(store).await?;
    println!("Journal index statistics:");
    println!("  Entries: {}", stats.total_entries);
    println!("  Chunks:  {}", stats.total_chunks);
    println!("  Words:   {}", stats.total_words);
    match (&stats.first_date, &stats.last_date) {
        (Some(first), Some(last)) => println!("  Dates:   {} to {}", first, last),
        _ => println!("  Dates:   (none)"),
    }
    Ok(())
}

pub async fn run_list(store: &dyn VectorStore) -> Result<()> {
    let entries = list_all_entries(store).await?;
    if entries.is_empty() {
        println!("Index is empty.");
        return Ok(());
    }
    println!("{} entries indexed:", entries.len());
    for entry in &entries {
        println!(
            "  {}  {} chunk{}, {} words",
            entry.date,
            entry.chunk_count,
            if entry.chunk_count == 1 { "" } else { "s" },
            entry.word_count
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::ingest::ingest;
    use crate::models::Entry;
    use crate::store::sqlite::SqliteStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn entry(date: &str, text: &str) -> Entry {
        Entry {
            date: date.to_string(),
            text: text.to_string(),
            word_count: text.split_whitespace().count() as i64,
            source_file: format!("/scans/{}.txt", date),
        }
    }

    async fn open_store(tmp: &TempDir) -> SqliteStore {
        SqliteStore::open(&tmp.path().join("vector_db"), Arc::new(HashingEmbedder::new(64)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_stats_empty_index() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let stats = get_stats(&store).await.unwrap();
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.total_chunks, 0);
        assert_eq!(stats.total_words, 0);
        assert!(stats.first_date.is_none());
        assert!(stats.last_date.is_none());
    }

    #[tokio::test]
    async fn test_words_counted_once_per_entry() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        // 120 words, chunk_size 100 chars -> multiple chunks for one entry.
        let text = "word ".repeat(120).trim_end().to_string();
        ingest(&store, &[entry("2025-03-01", &text)], 100, 10)
            .await
            .unwrap();

        let stats = get_stats(&store).await.unwrap();
        assert_eq!(stats.total_entries, 1);
        assert!(stats.total_chunks > 1);
        assert_eq!(stats.total_words, 120);
    }

    #[tokio::test]
    async fn test_stats_date_range() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        let entries = vec![
            entry("2025-01-20", "Middle of the month."),
            entry("2025-01-05", "Early in the month."),
            entry("2025-02-01", "A new month begins."),
        ];
        ingest(&store, &entries, 500, 50).await.unwrap();

        let stats = get_stats(&store).await.unwrap();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.first_date.as_deref(), Some("2025-01-05"));
        assert_eq!(stats.last_date.as_deref(), Some("2025-02-01"));
    }

    #[tokio::test]
    async fn test_list_entries_ascending_by_date() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        let entries = vec![
            entry("2025-01-20", "Second entry written."),
            entry("2025-01-05", "First entry written."),
        ];
        ingest(&store, &entries, 500, 50).await.unwrap();

        let listed = list_all_entries(&store).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].date, "2025-01-05");
        assert_eq!(listed[1].date, "2025-01-20");
        assert_eq!(listed[0].chunk_count, 1);
        assert_eq!(listed[0].word_count, 3);
    }

    #[tokio::test]
    async fn test_all_dates_sorted_unique() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        let entries = vec![
            entry("2025-01-20", "Later note."),
            entry("2025-01-05", "Earlier note."),
        ];
        ingest(&store, &entries, 500, 50).await.unwrap();

        let dates = get_all_dates(&store).await.unwrap();
        assert_eq!(dates, vec!["2025-01-05", "2025-01-20"]);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
