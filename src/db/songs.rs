//! Song catalog operations.

use crate::error::DatabaseError;
use crate::types::{ItemHandle, TagRecord};
use crate::{Error, Result};

use super::{Database, SongRow};

impl Database {
    /// Record one item's tags in the catalog
    ///
    /// Appends a row. Nothing is deduplicated, so downloading the same item
    /// twice produces two rows.
    pub async fn insert_song(&self, item: &ItemHandle, tags: &TagRecord) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO songs (
                source_url, title, artist, genre, album,
                track_num, release_year, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item)
        .bind(&tags.title)
        .bind(&tags.artist)
        .bind(&tags.genre)
        .bind(&tags.album)
        .bind(tags.track_num.map(i64::from))
        .bind(&tags.release_year)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert song: {}",
                e
            )))
        })?;

        Ok(result.last_insert_rowid())
    }

    /// List every catalog row in insertion order
    pub async fn list_songs(&self) -> Result<Vec<SongRow>> {
        let rows = sqlx::query_as::<_, SongRow>(
            r#"
            SELECT
                id, source_url, title, artist, genre, album,
                track_num, release_year, created_at
            FROM songs
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list songs: {}",
                e
            )))
        })?;

        Ok(rows)
    }
}
