//! Destructive index operations, snapshot-first.
//!
//! Every delete path follows the same sequence: flush the WAL, take a
//! snapshot, resolve target ids, delete, report the count. Resolution
//! happens after the snapshot, so a delete that matches nothing still
//! leaves a backup behind — the accepted cost of safety-first ordering.
//! `clear_all` is the one exception: an already-empty index has nothing
//! to protect, so it short-circuits without a snapshot.
//!
//! Only this module deletes chunks; snapshots themselves are owned by
//! [`crate::backup`].

use anyhow::Result;
use tracing::info;

use crate::backup;
use crate::store::sqlite::SqliteStore;
use crate::store::{DateFilter, VectorStore};

/// Delete every chunk whose metadata `date` matches. Returns the number
/// of chunks deleted (0 if the date has no entries).
pub async fn delete_by_date(store: &SqliteStore, date: &str, max_backups: usize) -> Result<u64> {
    store.flush_wal().await?;
    backup::snapshot(store.path(), "pre-delete", max_backups)?;

    let records = store.get(None, Some(&DateFilter::eq(date))).await?;
    if records.is_empty() {
        println!("No entries found for date: {}", date);
        return Ok(0);
    }

    let ids: Vec<String> = records.into_iter().map(|r| r.id).collect();
    store.delete(&ids).await?;

    info!(date, count = ids.len(), "deleted chunks by date");
    Ok(ids.len() as u64)
}

/// Delete every chunk whose id starts with `entry_id` (normally a date,
/// matching all of that entry's `<date>_chunk_<i>` ids).
pub async fn delete_by_entry(
    store: &SqliteStore,
    entry_id: &str,
    max_backups: usize,
) -> Result<u64> {
    store.flush_wal().await?;
    backup::snapshot(store.path(), "pre-delete", max_backups)?;

    let ids = store.ids_with_prefix(entry_id).await?;
    if ids.is_empty() {
        println!("No entry found with id: {}", entry_id);
        return Ok(0);
    }

    store.delete(&ids).await?;

    info!(entry_id, count = ids.len(), "deleted chunks by entry id");
    Ok(ids.len() as u64)
}

/// Delete every chunk in the index. Skips the snapshot entirely when the
/// index is already empty.
pub async fn clear_all(store: &SqliteStore, max_backups: usize) -> Result<u64> {
    let total = store.count().await?;
    if total == 0 {
        println!("Index is already empty.");
        return Ok(0);
    }

    store.flush_wal().await?;
    backup::snapshot(store.path(), "pre-clear", max_backups)?;

    let ids: Vec<String> = store
        .get(None, None)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();
    store.delete(&ids).await?;

    info!(count = total, "cleared all chunks");
    Ok(total)
}
