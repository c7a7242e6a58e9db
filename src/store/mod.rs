//! Vector index adapter.
//!
//! The [`VectorStore`] trait is the boundary to the external
//! embedding-plus-similarity-search primitive. Everything else in the
//! engine addresses chunk data only through this contract; the concrete
//! backend ([`sqlite::SqliteStore`]) owns physical storage.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod sqlite;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::ChunkRecord;

/// Metadata filter over the chunk `date` field.
///
/// `eq` matches one date exactly; `start`/`end` bound an inclusive range.
/// Dates are `YYYY-MM-DD` strings, so lexicographic order is calendar order.
#[derive(Debug, Clone, Default)]
pub struct DateFilter {
    pub eq: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateFilter {
    pub fn eq(date: &str) -> Self {
        Self {
            eq: Some(date.to_string()),
            ..Self::default()
        }
    }

    pub fn range(start: &str, end: &str) -> Self {
        Self {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            ..Self::default()
        }
    }
}

/// A chunk with its ranking distance, as returned by [`VectorStore::query`].
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub record: ChunkRecord,
    /// `1 - cosine_similarity` to the query vector; lower = more similar.
    pub distance: f64,
}

/// Abstract vector index backend.
///
/// All operations are synchronous from the engine's point of view — they
/// may block on embedding inference or disk I/O, and no timeout or
/// cancellation is imposed here.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`add`](VectorStore::add) | Embed and store one chunk with metadata |
/// | [`query`](VectorStore::query) | k-nearest chunks by distance, optionally date-filtered |
/// | [`get`](VectorStore::get) | Exact lookup/listing, no ranking |
/// | [`delete`](VectorStore::delete) | Remove records; unknown ids are a no-op |
/// | [`count`](VectorStore::count) | Number of stored chunks |
/// | [`contains`](VectorStore::contains) | Existence check for the dedup layer |
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Embed `record.text` and store vector plus metadata keyed by id.
    ///
    /// Fails with [`StoreError::Duplicate`] if the id already exists.
    async fn add(&self, record: &ChunkRecord) -> Result<(), StoreError>;

    /// Embed `text` and return up to `k` nearest chunks. An empty index
    /// yields an empty list, not an error.
    async fn query(
        &self,
        text: &str,
        k: usize,
        filter: Option<&DateFilter>,
    ) -> Result<Vec<ScoredChunk>, StoreError>;

    /// Unranked lookup by ids and/or metadata filter; both `None` lists
    /// everything, in the index's natural enumeration order.
    async fn get(
        &self,
        ids: Option<&[String]>,
        filter: Option<&DateFilter>,
    ) -> Result<Vec<ChunkRecord>, StoreError>;

    /// Remove the named records. Ids that do not exist are ignored.
    async fn delete(&self, ids: &[String]) -> Result<(), StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    async fn contains(&self, id: &str) -> Result<bool, StoreError>;
}
