//! Conversion and tagging of downloaded audio
//!
//! [`AudioPostProcessor`] turns a raw download into the final library file:
//! it runs the configured [`Transcoder`] to produce the destination format,
//! removes the raw input once conversion succeeds, and writes the job's tag
//! fields onto the converted file via `lofty`.

use crate::error::{Error, PostProcessError, Result};
use crate::transcode::Transcoder;
use crate::types::TagRecord;
use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::prelude::Accessor;
use lofty::read_from_path;
use lofty::tag::{ItemKey, Tag};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tracing::{debug, warn};

/// Converts raw downloads into the target format and writes tags onto them
#[derive(Clone)]
pub struct AudioPostProcessor {
    transcoder: Arc<dyn Transcoder>,
}

impl AudioPostProcessor {
    /// Create a post-processor over the given transcoder
    pub fn new(transcoder: Arc<dyn Transcoder>) -> Self {
        Self { transcoder }
    }

    /// Convert a raw audio file into the destination format
    ///
    /// A pre-existing destination file is replaced. On success the raw input
    /// is removed; on failure it is left in place so a later attempt can
    /// reuse it.
    ///
    /// # Errors
    ///
    /// Returns [`PostProcessError::ConversionFailed`] when the transcoder
    /// exits with a failure status, or
    /// [`PostProcessError::TranscoderUnavailable`] when no converter binary
    /// was found at startup.
    pub async fn convert(&self, raw_file: &Path, destination: &Path) -> Result<PathBuf> {
        debug!(
            source = ?raw_file,
            ?destination,
            transcoder = self.transcoder.name(),
            "converting raw audio"
        );

        if tokio::fs::metadata(destination).await.is_ok() {
            tokio::fs::remove_file(destination).await?;
        }

        self.transcoder.convert(raw_file, destination).await?;

        if let Err(e) = tokio::fs::remove_file(raw_file).await {
            warn!(path = ?raw_file, error = %e, "failed to remove raw file after conversion");
        }

        debug!(?destination, "conversion complete");
        Ok(destination.to_path_buf())
    }

    /// Write tag fields onto a converted file
    ///
    /// Each field the record carries is written verbatim; fields the record
    /// does not carry are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PostProcessError::TaggingFailed`] when the file's tag
    /// container cannot be opened or written.
    pub async fn tag(&self, file: &Path, record: &TagRecord) -> Result<()> {
        let path = file.to_path_buf();
        let record = record.clone();

        // lofty does synchronous file IO
        spawn_blocking(move || write_tags(&path, &record))
            .await
            .map_err(|e| {
                Error::PostProcess(PostProcessError::TaggingFailed {
                    path: file.to_path_buf(),
                    reason: format!("tagging task panicked: {}", e),
                })
            })?
    }
}

fn write_tags(path: &Path, record: &TagRecord) -> Result<()> {
    let mut tagged_file = read_from_path(path).map_err(|e| tagging_failed(path, e))?;

    let tag_type = tagged_file.primary_tag_type();
    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    let tag = tagged_file
        .tag_mut(tag_type)
        .ok_or_else(|| tagging_failed(path, "no writable tag container"))?;

    if let Some(title) = &record.title {
        tag.set_title(title.clone());
    }
    if let Some(artist) = &record.artist {
        tag.set_artist(artist.clone());
    }
    if let Some(genre) = &record.genre {
        tag.set_genre(genre.clone());
    }
    if let Some(album) = &record.album {
        tag.set_album(album.clone());
    }
    if let Some(track_num) = record.track_num {
        tag.set_track(track_num);
    }
    if let Some(year) = &record.release_year {
        tag.insert_text(ItemKey::Year, year.clone());
    }

    tagged_file
        .save_to_path(path, WriteOptions::default())
        .map_err(|e| tagging_failed(path, e))?;

    debug!(?path, "tags written");
    Ok(())
}

fn tagging_failed(path: &Path, reason: impl std::fmt::Display) -> Error {
    Error::PostProcess(PostProcessError::TaggingFailed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    })
}
