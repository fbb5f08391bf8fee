//! Output path construction and collision handling for downloaded audio

use crate::config::FileCollisionAction;
use crate::error::{Error, PostProcessError, Result};
use std::path::{Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Characters that are invalid in filenames on at least one supported platform
const HOSTILE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Sanitize a single path component (title, artist, URL) for use in a filename
///
/// Replaces path separators and other filesystem-hostile characters with `_`,
/// strips control characters, and trims leading/trailing whitespace and dots.
/// An input that sanitizes to nothing becomes `"untitled"`.
///
/// # Examples
///
/// ```
/// use music_dl::naming::sanitize_component;
///
/// assert_eq!(sanitize_component("AC/DC: Live?"), "AC_DC_ Live_");
/// assert_eq!(sanitize_component("  plain title  "), "plain title");
/// assert_eq!(sanitize_component("..."), "untitled");
/// ```
#[must_use]
pub fn sanitize_component(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if HOSTILE_CHARS.contains(&c) { '_' } else { c })
        .collect();

    // Trailing dots and surrounding whitespace are rejected by Windows
    let trimmed = cleaned.trim().trim_end_matches('.').trim_end();
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Build the directory name for an album: `"<artist> - <title>"`
#[must_use]
pub fn album_dir_name(artist: &str, title: &str) -> String {
    format!(
        "{} - {}",
        sanitize_component(artist),
        sanitize_component(title)
    )
}

/// Build the filename for one album track: `"<track>. <title>.<ext>"`
///
/// Track numbers come from the album's enumeration order, so filenames sort
/// in playback order.
#[must_use]
pub fn album_track_filename(track_num: u32, title: &str, extension: &str) -> String {
    format!("{}. {}.{}", track_num, sanitize_component(title), extension)
}

/// Build the filename for a single download: `"<url> - <title>.<ext>"`
///
/// The source URL is embedded so a file on disk can be traced back to where
/// it came from without consulting the catalog.
#[must_use]
pub fn single_filename(source_url: &str, title: &str, extension: &str) -> String {
    format!(
        "{} - {}.{}",
        sanitize_component(source_url),
        sanitize_component(title),
        extension
    )
}

/// Resolve a destination path against existing files, according to the
/// configured collision action
///
/// # Arguments
///
/// * `path` - The desired file path
/// * `action` - How to handle file collisions
///
/// # Returns
///
/// Returns the final path to use. For Rename action, this may have a suffix
/// added. For Skip action, returns an error if the file already exists.
/// For Overwrite action, returns the original path unchanged.
///
/// # Examples
///
/// ```
/// use music_dl::naming::resolve_collision;
/// use music_dl::config::FileCollisionAction;
/// use std::path::Path;
///
/// let path = Path::new("/tmp/song.mp3");
/// let unique = resolve_collision(path, FileCollisionAction::Rename).unwrap();
/// // If /tmp/song.mp3 exists, returns /tmp/song (1).mp3
/// // If that exists too, returns /tmp/song (2).mp3, etc.
/// ```
pub fn resolve_collision(path: &Path, action: FileCollisionAction) -> Result<PathBuf> {
    match action {
        FileCollisionAction::Overwrite => Ok(path.to_path_buf()),
        FileCollisionAction::Skip => {
            if path.exists() {
                return Err(Error::PostProcess(PostProcessError::FileCollision {
                    path: path.to_path_buf(),
                    reason: "File already exists and collision action is Skip".to_string(),
                }));
            }
            Ok(path.to_path_buf())
        }
        FileCollisionAction::Rename => {
            if !path.exists() {
                return Ok(path.to_path_buf());
            }

            let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
                Error::PostProcess(PostProcessError::InvalidPath {
                    path: path.to_path_buf(),
                    reason: "Cannot extract file stem".to_string(),
                })
            })?;

            let extension = path.extension().and_then(|e| e.to_str());

            let parent = path.parent().ok_or_else(|| {
                Error::PostProcess(PostProcessError::InvalidPath {
                    path: path.to_path_buf(),
                    reason: "Cannot extract parent directory".to_string(),
                })
            })?;

            // Try adding (1), (2), (3), ... until we find a unique name
            for i in 1..=MAX_RENAME_ATTEMPTS {
                let new_name = match extension {
                    Some(ext) => format!("{} ({}).{}", stem, i, ext),
                    None => format!("{} ({})", stem, i),
                };
                let new_path = parent.join(new_name);
                if !new_path.exists() {
                    return Ok(new_path);
                }
            }

            Err(Error::PostProcess(PostProcessError::FileCollision {
                path: path.to_path_buf(),
                reason: "Could not find unique filename after 9999 attempts".to_string(),
            }))
        }
    }
}
