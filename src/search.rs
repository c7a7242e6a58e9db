//! Semantic search over indexed journal chunks.
//!
//! Thin layer over the vector store: ranked nearest-neighbor queries,
//! optional date-range restriction, and result shaping into [`SearchHit`]s.
//! An empty index always yields an empty result set, never an error.

use anyhow::Result;

use crate::models::SearchHit;
use crate::store::{DateFilter, VectorStore};

/// Ranked semantic search: up to `k` hits, nearest first.
pub async fn search(store: &dyn VectorStore, query: &str, k: usize) -> Result<Vec<SearchHit>> {
    let scored = store.query(query, k, None).await?;
    Ok(scored
        .into_iter()
        .map(|s| SearchHit {
            date: s.record.meta.date,
            text: s.record.text,
            chunk_index: s.record.meta.chunk_index,
            distance: Some(s.distance),
        })
        .collect())
}

/// Search within an inclusive date range.
///
/// With a query this is a ranked semantic search restricted to the range.
/// Without one it is an unranked listing in the index's natural
/// enumeration order — callers needing chronological order must sort by
/// `date` themselves.
pub async fn search_by_date_range(
    store: &dyn VectorStore,
    start: &str,
    end: &str,
    query: Option<&str>,
    k: usize,
) -> Result<Vec<SearchHit>> {
    let filter = DateFilter::range(start, end);

    let hits = match query {
        Some(q) => store
            .query(q, k, Some(&filter))
            .await?
            .into_iter()
            .map(|s| SearchHit {
                date: s.record.meta.date,
                text: s.record.text,
                chunk_index: s.record.meta.chunk_index,
                distance: Some(s.distance),
            })
            .collect(),
        None => {
            let mut records = store.get(None, Some(&filter)).await?;
            records.truncate(k);
            records
                .into_iter()
                .map(|r| SearchHit {
                    date: r.meta.date,
                    text: r.text,
                    chunk_index: r.meta.chunk_index,
                    distance: None,
                })
                .collect()
        }
    };

    Ok(hits)
}

/// CLI entry point: run a search and print ranked results.
pub async fn run_search(store: &dyn VectorStore, query: &str, k: usize) -> Result<()> {
    let results = search(store, query, k).await?;
    print_hits(&results);
    Ok(())
}

/// CLI entry point: date-restricted search. Without a query this is a plain
/// listing of chunks in the range.
pub async fn run_search_range(
    store: &dyn VectorStore,
    start: &str,
    end: &str,
    query: Option<&str>,
    k: usize,
) -> Result<()> {
    let results = search_by_date_range(store, start, end, query, k).await?;
    print_hits(&results);
    Ok(())
}

fn print_hits(results: &[SearchHit]) {
    if results.is_empty() {
        println!("No results.");
        return;
    }

    println!("Found {} results:", results.len());
    println!();
    for (i, hit) in results.iter().enumerate() {
        match hit.distance {
            Some(d) => println!("{}. [{}] (distance {:.4})", i + 1, hit.date, d),
            None => println!("{}. [{}]", i + 1, hit.date),
        }
        let excerpt: String = hit.text.chars().take(300).collect();
        println!("   {}", excerpt.replace('\n', " "));
        println!();
    }
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

    async fn seeded_store(tmp: &TempDir) -> SqliteStore {
        let store =
            SqliteStore::open(&tmp.path().join("vector_db"), Arc::new(HashingEmbedder::new(128)))
                .await
                .unwrap();
        let entries = vec![
            entry(
                "2025-02-01",
                "I went hiking in the mountains today and saw beautiful scenery.",
            ),
            entry("2025-02-10", "Spent the afternoon reading a novel by the fire."),
            entry("2025-03-05", "Cooked dinner for friends and we talked late."),
        ];
        ingest(&store, &entries, 500, 50).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_search_empty_index_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let store =
            SqliteStore::open(&tmp.path().join("vector_db"), Arc::new(HashingEmbedder::new(128)))
                .await
                .unwrap();
        let hits = search(&store, "anything", 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_finds_matching_entry() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp).await;

        let hits = search(&store, "hiking mountains", 5).await.unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].date, "2025-02-01");
        assert_eq!(hits[0].chunk_index, 0);
        assert!(hits[0].distance.is_some());
    }

    #[tokio::test]
    async fn test_date_range_with_query_is_ranked_and_filtered() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp).await;

        let hits = search_by_date_range(&store, "2025-02-01", "2025-02-28", Some("hiking"), 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.date.starts_with("2025-02")));
        assert_eq!(hits[0].date, "2025-02-01");
    }

    #[tokio::test]
    async fn test_date_range_without_query_is_unranked_listing() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp).await;

        let hits = search_by_date_range(&store, "2025-02-01", "2025-03-31", None, 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|h| h.distance.is_none()));
    }

    #[tokio::test]
    async fn test_date_range_outside_data_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp).await;

        let hits = search_by_date_range(&store, "2024-01-01", "2024-12-31", Some("hiking"), 10)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }
}
