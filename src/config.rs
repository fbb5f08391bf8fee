//! Configuration types for music-dl

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Download behavior configuration (retries, identity/proxy toggles, pacing)
///
/// Groups settings related to how streams are fetched and how batches are
/// paced. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Working directory for raw (unconverted) downloads (default: "working")
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Destination directory for single-song downloads (default: "downloads/singles")
    #[serde(default = "default_singles_dir")]
    pub singles_dir: PathBuf,

    /// Destination directory for album downloads (default: "downloads/albums")
    ///
    /// Each album gets its own `"<artist> - <title>"` subdirectory under this root.
    #[serde(default = "default_albums_dir")]
    pub albums_dir: PathBuf,

    /// Maximum stream-resolution attempts per item (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Authenticate provider sessions with OAuth credentials (default: false)
    #[serde(default)]
    pub use_oauth: bool,

    /// Allow cached OAuth tokens to be reused across sessions (default: false)
    #[serde(default)]
    pub allow_oauth_cache: bool,

    /// Route provider and stream traffic through the configured proxies (default: false)
    #[serde(default)]
    pub use_proxies: bool,

    /// Proxy URL for http traffic (ignored unless `use_proxies` is set)
    #[serde(default)]
    pub http_proxy: Option<String>,

    /// Proxy URL for https traffic (ignored unless `use_proxies` is set)
    #[serde(default)]
    pub https_proxy: Option<String>,

    /// Run batch items concurrently instead of one at a time (default: true)
    #[serde(default = "default_true")]
    pub download_concurrently: bool,

    /// Pause between successive pipeline launches (default: false)
    #[serde(default)]
    pub add_delay_between_downloads: bool,

    /// Length of the inter-launch pause in milliseconds (default: 5000)
    #[serde(default = "default_delay_length_ms")]
    pub delay_length_ms: u64,

    /// What to do when a destination filename already exists
    #[serde(default)]
    pub on_duplicate: FileCollisionAction,
}

impl DownloadConfig {
    /// The configured inter-launch delay, or `None` when pacing is disabled.
    pub fn launch_delay(&self) -> Option<Duration> {
        if self.add_delay_between_downloads {
            Some(Duration::from_millis(self.delay_length_ms))
        } else {
            None
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            singles_dir: default_singles_dir(),
            albums_dir: default_albums_dir(),
            max_retries: default_max_retries(),
            use_oauth: false,
            allow_oauth_cache: false,
            use_proxies: false,
            http_proxy: None,
            https_proxy: None,
            download_concurrently: true,
            add_delay_between_downloads: false,
            delay_length_ms: default_delay_length_ms(),
            on_duplicate: FileCollisionAction::default(),
        }
    }
}

/// External tool and output format configuration
///
/// Groups settings for the transcoder binary and the converted output format.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to ffmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for ffmpeg if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Target audio format / output file extension (default: "mp3")
    #[serde(default = "default_audio_format")]
    pub audio_format: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            search_path: true,
            audio_format: default_audio_format(),
        }
    }
}

/// Tagging configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TaggingConfig {
    /// How descriptive tags are produced for downloaded items
    #[serde(default)]
    pub tag_mode: TagMode,
}

/// Main configuration for MusicDownloader
///
/// Fields are organized into logical sub-configs for maintainability:
/// - [`download`](DownloadConfig) — directories, retries, identity/proxy toggles, pacing
/// - [`tools`](ToolsConfig) — transcoder binary, output format
/// - [`tagging`](TaggingConfig) — tag production mode
///
/// All sub-config fields are flattened for serialization, meaning the
/// JSON/TOML format stays flat (no nesting). Individual fields are also
/// accessible directly on `Config` via accessor methods for convenience.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download behavior settings (directories, retries, pacing)
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// Transcoder binary and output format
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// Tag production mode
    #[serde(flatten)]
    pub tagging: TaggingConfig,

    /// Data storage and state management
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

// Convenience accessors — allow call sites to use `config.working_dir()` etc.
// without reaching through the sub-config structs.
impl Config {
    /// Working directory for raw downloads
    pub fn working_dir(&self) -> &PathBuf {
        &self.download.working_dir
    }

    /// Destination directory for single-song downloads
    pub fn singles_dir(&self) -> &PathBuf {
        &self.download.singles_dir
    }

    /// Destination directory for album downloads
    pub fn albums_dir(&self) -> &PathBuf {
        &self.download.albums_dir
    }

    /// Database path
    pub fn database_path(&self) -> &PathBuf {
        &self.persistence.database_path
    }

    /// Target audio format / output file extension
    pub fn audio_format(&self) -> &str {
        &self.tools.audio_format
    }
}

/// Tag production mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMode {
    /// Build tags from provider metadata without user interaction (default)
    #[default]
    Automatic,
    /// Tags come from a caller-supplied source (interactive collection lives
    /// outside this library)
    Manual,
}

impl TagMode {
    /// Stable snake_case name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TagMode::Automatic => "automatic",
            TagMode::Manual => "manual",
        }
    }
}

/// File collision handling strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCollisionAction {
    /// Append (1), (2), etc. to filename (default)
    #[default]
    Rename,
    /// Overwrite existing file
    Overwrite,
    /// Skip the file, keep existing
    Skip,
}

/// Data storage and state management configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Database path (default: "music-dl.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

// Default value functions
fn default_working_dir() -> PathBuf {
    PathBuf::from("working")
}

fn default_singles_dir() -> PathBuf {
    PathBuf::from("downloads/singles")
}

fn default_albums_dir() -> PathBuf {
    PathBuf::from("downloads/albums")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("music-dl.db")
}

fn default_max_retries() -> u32 {
    3
}

fn default_delay_length_ms() -> u64 {
    5000
}

fn default_audio_format() -> String {
    "mp3".to_string()
}

fn default_true() -> bool {
    true
}
