//! # Journal Recall
//!
//! A local-first semantic index over OCR'd handwritten journal entries.
//!
//! Journal Recall ingests dated journal text (plus its OCR metadata
//! sidecars), chunks it on sentence boundaries, embeds each chunk, and
//! stores everything in a single SQLite index that supports semantic
//! search, date-range queries, and snapshot-protected deletion.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────┐
//! │ OCR output   │──▶│  Ingest      │──▶│  SQLite    │
//! │ text + meta  │   │ Chunk+Embed  │   │ chunks+vec │
//! └──────────────┘   └──────────────┘   └────┬──────┘
//!                                            │
//!                        ┌──────────────────┼──────────────┐
//!                        ▼                  ▼              ▼
//!                   ┌─────────┐       ┌──────────┐   ┌──────────┐
//!                   │ Search  │       │ Stats /  │   │ Backups  │
//!                   │ (jrnl)  │       │ Listing  │   │ +Restore │
//!                   └─────────┘       └──────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! jrnl ingest ./ocr_output        # index new journal entries
//! jrnl search "camping trips"     # semantic search
//! jrnl list                       # every indexed entry
//! jrnl delete 2025-01-15 --yes    # snapshot, then remove one entry
//! jrnl backup                     # manual snapshot
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`chunk`] | Sentence-aware text chunking |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`store`] | Vector store trait and SQLite backend |
//! | [`ingest`] | OCR directory loading and indexing |
//! | [`search`] | Semantic and date-range search |
//! | [`stats`] | Index summaries and listings |
//! | [`lifecycle`] | Snapshot-first deletion |
//! | [`backup`] | Snapshots, retention, and restore |

pub mod backup;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod lifecycle;
pub mod models;
pub mod search;
pub mod stats;
pub mod store;
