//! Tag assembly for downloaded audio
//!
//! [`TagSource`] is the seam a consumer implements to supply its own tags
//! (the `manual` tag mode). The crate ships [`AutomaticTagSource`], which
//! assembles every [`TagRecord`] from provider metadata alone: item titles
//! from item info, artist/genre/album/year from the album context when one
//! exists, author and publish year as fallbacks when it does not.

use crate::error::{DownloadError, Error, Result};
use crate::provider::{CollectionInfo, MediaProvider, ProviderSession};
use crate::types::{ItemHandle, TagRecord};
use async_trait::async_trait;
use chrono::Datelike;
use std::collections::HashMap;
use std::sync::Arc;

/// Album-level tag context shared by every track of one collection
#[derive(Clone, Debug)]
pub struct AlbumTags {
    /// Album title, written to each track's album field
    pub title: String,
    /// Album artist
    pub artist: String,
    /// Genre applied to every track, when known
    pub genre: Option<String>,
    /// Release year applied to every track
    pub release_year: Option<String>,
    /// Members in collection enumeration order, duplicates preserved.
    /// Position here is what fixes the 1..N track numbering.
    pub members: Vec<ItemHandle>,
    /// Track number per member handle, for tag-source lookups. A handle the
    /// collection lists more than once keeps only its last position; job
    /// numbering never relies on this map, it is positional over `members`.
    pub track_nums: HashMap<ItemHandle, u32>,
}

impl AlbumTags {
    /// Derive album tags from collection info
    ///
    /// Title and owner map directly, the release year comes from the
    /// collection's last-updated date, and members are numbered 1..N in
    /// enumeration order. That numbering is fixed here, before any download
    /// runs, so output filenames are deterministic regardless of which
    /// pipeline finishes first.
    #[must_use]
    pub fn from_collection(info: &CollectionInfo) -> Self {
        let track_nums = info
            .members
            .iter()
            .enumerate()
            .map(|(index, member)| (member.clone(), index as u32 + 1))
            .collect();

        Self {
            title: info.title.clone(),
            artist: info.owner.clone(),
            genre: None,
            release_year: info.last_updated.map(|d| d.year().to_string()),
            members: info.members.clone(),
            track_nums,
        }
    }
}

/// Supplies the tag record for each item before its download starts
#[async_trait]
pub trait TagSource: Send + Sync {
    /// Assemble tags for one item
    ///
    /// # Arguments
    ///
    /// * `session` - Identity and transport scope for any provider calls
    /// * `item` - Source identifier for the item
    /// * `album` - Album context when the item is downloaded as part of one
    ///
    /// # Errors
    ///
    /// Returns an error when tags cannot be assembled; the item's job is then
    /// never built.
    async fn song_tags(
        &self,
        session: &ProviderSession,
        item: &ItemHandle,
        album: Option<&AlbumTags>,
    ) -> Result<TagRecord>;

    /// Assemble the album-level context for a collection
    ///
    /// The returned track-number map must cover every member that should be
    /// downloaded; the batch is built from it.
    ///
    /// # Errors
    ///
    /// Returns an error when the collection's context cannot be assembled;
    /// the whole album download is then abandoned before any job starts.
    async fn album_tags(
        &self,
        session: &ProviderSession,
        collection: &ItemHandle,
    ) -> Result<AlbumTags>;
}

/// Tag source that derives every field from provider metadata
pub struct AutomaticTagSource {
    provider: Arc<dyn MediaProvider>,
}

impl AutomaticTagSource {
    /// Create an automatic tag source over the given provider
    #[must_use]
    pub fn new(provider: Arc<dyn MediaProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TagSource for AutomaticTagSource {
    async fn song_tags(
        &self,
        session: &ProviderSession,
        item: &ItemHandle,
        album: Option<&AlbumTags>,
    ) -> Result<TagRecord> {
        let info = self
            .provider
            .fetch_item_info(session, item)
            .await
            .map_err(|e| Error::Download(DownloadError::MetadataFetch(e.to_string())))?;

        let record = match album {
            Some(album) => TagRecord {
                title: Some(info.title),
                artist: Some(album.artist.clone()),
                genre: album.genre.clone(),
                album: Some(album.title.clone()),
                track_num: album.track_nums.get(item).copied(),
                release_year: album.release_year.clone(),
            },
            None => TagRecord {
                title: Some(info.title),
                artist: Some(info.author),
                genre: None,
                album: None,
                track_num: None,
                release_year: info.publish_date.map(|d| d.year().to_string()),
            },
        };

        Ok(record)
    }

    async fn album_tags(
        &self,
        session: &ProviderSession,
        collection: &ItemHandle,
    ) -> Result<AlbumTags> {
        let info = self
            .provider
            .fetch_collection_info(session, collection)
            .await
            .map_err(|e| Error::Download(DownloadError::MetadataFetch(e.to_string())))?;

        Ok(AlbumTags::from_collection(&info))
    }
}
