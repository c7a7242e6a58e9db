//! SQLite-backed [`VectorStore`].
//!
//! The persisted state is a single directory (the "index directory")
//! containing `index.sqlite` in WAL mode. Chunk text and metadata live in
//! the `chunks` table; embedding vectors are little-endian f32 BLOBs in
//! `embeddings`. Similarity search fetches candidate vectors and computes
//! cosine similarity in Rust — at one person's journaling volume a
//! brute-force scan is well under a millisecond.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob, Embedder};
use crate::error::StoreError;
use crate::models::{ChunkMetadata, ChunkRecord};

use super::{DateFilter, ScoredChunk, VectorStore};

/// Filename of the database inside the index directory.
const DB_FILE: &str = "index.sqlite";

pub struct SqliteStore {
    pool: SqlitePool,
    path: PathBuf,
    embedder: Arc<dyn Embedder>,
}

impl SqliteStore {
    /// Open (creating if needed) the index at `index_dir`.
    ///
    /// The embedder handle is owned by the store for its whole lifetime;
    /// [`close`](Self::close) is the teardown path.
    pub async fn open(index_dir: &Path, embedder: Arc<dyn Embedder>) -> Result<Self, StoreError> {
        std::fs::create_dir_all(index_dir)?;
        let db_path = index_dir.join(DB_FILE);

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))
            .map_err(sqlx::Error::from)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            path: index_dir.to_path_buf(),
            embedder,
        };
        store.init_schema().await?;
        Ok(store)
    }

    /// The index directory this store persists into.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                id           TEXT PRIMARY KEY,
                text         TEXT NOT NULL,
                date         TEXT NOT NULL,
                chunk_index  INTEGER NOT NULL,
                total_chunks INTEGER NOT NULL,
                word_count   INTEGER NOT NULL,
                source_file  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Secondary index so date-scoped resolution is a range scan, not a
        // full id walk.
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_date ON chunks(date)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS embeddings (
                chunk_id TEXT PRIMARY KEY,
                vector   BLOB NOT NULL,
                model    TEXT NOT NULL,
                dims     INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Move WAL contents into the main database file so a directory copy
    /// captures the full state. Called before every snapshot.
    pub async fn flush_wal(&self) -> Result<(), StoreError> {
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// All ids starting with `prefix`, used by delete-by-entry. Prefixes
    /// are dates or date-derived ids, so no LIKE metacharacter escaping
    /// is needed.
    pub async fn ids_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT id FROM chunks WHERE id LIKE ? ORDER BY id")
            .bind(format!("{}%", prefix))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|row| row.get::<String, _>("id")).collect())
    }

    fn filter_clause(filter: Option<&DateFilter>) -> (String, Vec<String>) {
        let mut clauses = Vec::new();
        let mut binds = Vec::new();
        if let Some(f) = filter {
            if let Some(ref eq) = f.eq {
                clauses.push("date = ?");
                binds.push(eq.clone());
            }
            if let Some(ref start) = f.start {
                clauses.push("date >= ?");
                binds.push(start.clone());
            }
            if let Some(ref end) = f.end {
                clauses.push("date <= ?");
                binds.push(end.clone());
            }
        }
        let sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        (sql, binds)
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> ChunkRecord {
        ChunkRecord {
            id: row.get("id"),
            text: row.get("text"),
            meta: ChunkMetadata {
                date: row.get("date"),
                chunk_index: row.get("chunk_index"),
                total_chunks: row.get("total_chunks"),
                word_count: row.get("word_count"),
                source_file: row.get("source_file"),
            },
        }
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn add(&self, record: &ChunkRecord) -> Result<(), StoreError> {
        let vectors = self
            .embedder
            .embed(std::slice::from_ref(&record.text))
            .await
            .map_err(StoreError::Embedding)?;
        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Embedding(anyhow::anyhow!("empty embedding response")))?;

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO chunks (id, text, date, chunk_index, total_chunks, word_count, source_file)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.text)
        .bind(&record.meta.date)
        .bind(record.meta.chunk_index)
        .bind(record.meta.total_chunks)
        .bind(record.meta.word_count)
        .bind(&record.meta.source_file)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return Err(StoreError::Duplicate(record.id.clone()));
                }
            }
            return Err(e.into());
        }

        sqlx::query("INSERT INTO embeddings (chunk_id, vector, model, dims) VALUES (?, ?, ?, ?)")
            .bind(&record.id)
            .bind(vec_to_blob(&vector))
            .bind(self.embedder.model_name())
            .bind(vector.len() as i64)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn query(
        &self,
        text: &str,
        k: usize,
        filter: Option<&DateFilter>,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        if self.count().await? == 0 {
            return Ok(Vec::new());
        }

        let vectors = self
            .embedder
            .embed(std::slice::from_ref(&text.to_string()))
            .await
            .map_err(StoreError::Embedding)?;
        let query_vec = vectors
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Embedding(anyhow::anyhow!("empty embedding response")))?;

        let (clause, binds) = Self::filter_clause(filter);
        let sql = format!(
            "SELECT c.id, c.text, c.date, c.chunk_index, c.total_chunks, c.word_count, \
             c.source_file, e.vector \
             FROM chunks c JOIN embeddings e ON e.chunk_id = c.id{}",
            clause
        );
        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut scored: Vec<ScoredChunk> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("vector");
                let vec = blob_to_vec(&blob);
                let similarity = cosine_similarity(&query_vec, &vec) as f64;
                ScoredChunk {
                    record: Self::row_to_record(row),
                    distance: 1.0 - similarity,
                }
            })
            .collect();

        // Sort: distance asc, then id asc for a deterministic order.
        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.record.id.cmp(&b.record.id))
        });
        scored.truncate(k);

        Ok(scored)
    }

    async fn get(
        &self,
        ids: Option<&[String]>,
        filter: Option<&DateFilter>,
    ) -> Result<Vec<ChunkRecord>, StoreError> {
        let (clause, binds) = Self::filter_clause(filter);
        let sql = format!(
            "SELECT id, text, date, chunk_index, total_chunks, word_count, source_file \
             FROM chunks{}",
            clause
        );
        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut records: Vec<ChunkRecord> = rows.iter().map(Self::row_to_record).collect();

        if let Some(wanted) = ids {
            records.retain(|r| wanted.iter().any(|id| id == &r.id));
        }

        Ok(records)
    }

    async fn delete(&self, ids: &[String]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for id in ids {
            sqlx::query("DELETE FROM embeddings WHERE chunk_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM chunks WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn contains(&self, id: &str) -> Result<bool, StoreError> {
        let row: Option<i64> = sqlx::query_scalar("SELECT 1 FROM chunks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}
