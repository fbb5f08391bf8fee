//! Catalog layer for music-dl
//!
//! Handles SQLite persistence for downloaded-song records.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`songs`] — Song catalog inserts and reads

use sqlx::{FromRow, sqlite::SqlitePool};

mod migrations;
mod songs;

/// Song record from the catalog
///
/// Rows are append-only: one row per batch member, written before that item's
/// download pipeline starts.
#[derive(Debug, Clone, FromRow)]
pub struct SongRow {
    /// Unique database ID
    pub id: i64,
    /// Source URL the audio came from
    pub source_url: String,
    /// Track title
    pub title: Option<String>,
    /// Track artist
    pub artist: Option<String>,
    /// Genre
    pub genre: Option<String>,
    /// Album name
    pub album: Option<String>,
    /// Track number within the album
    pub track_num: Option<i64>,
    /// Release year as supplied
    pub release_year: Option<String>,
    /// Unix timestamp when the record was written
    pub created_at: i64,
}

/// Database handle for the song catalog
pub struct Database {
    pool: SqlitePool,
}
