//! Error types for music-dl
//!
//! This module provides comprehensive error handling for the library, including:
//! - Domain-specific error types (Download, PostProcess, Config, etc.)
//! - The closed stream-failure taxonomy the retry policy branches on
//! - Context information (file paths, attempt counts, failure kinds)

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for music-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for music-dl
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "tag_mode")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Download-related error
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Post-processing error (convert, tag)
    #[error("post-processing error: {0}")]
    PostProcess(#[from] PostProcessError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// External tool execution failed (ffmpeg)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary, not implemented, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Classified stream-resolution failures
///
/// Every failure crossing the resolver boundary is mapped into exactly one of
/// these kinds, so the retry policy branches on a stable internal vocabulary
/// instead of the remote provider's exact error taxonomy.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The item is age restricted for the current client identity
    #[error("video is age restricted")]
    AgeRestricted,

    /// The item is blocked in the current region
    #[error("video is blocked in the current region")]
    RegionBlocked,

    /// The item is unavailable (removed, private, no audio stream)
    #[error("video unavailable: {0}")]
    Unavailable(String),

    /// Any other provider-side failure
    #[error("provider error: {0}")]
    ProviderError(String),

    /// Transport-level failure while talking to the provider or fetching the stream
    #[error("network error: {0}")]
    NetworkError(String),
}

impl StreamError {
    /// The fieldless kind of this failure, for retention and reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            StreamError::AgeRestricted => FailureKind::AgeRestricted,
            StreamError::RegionBlocked => FailureKind::RegionBlocked,
            StreamError::Unavailable(_) => FailureKind::Unavailable,
            StreamError::ProviderError(_) => FailureKind::ProviderError,
            StreamError::NetworkError(_) => FailureKind::NetworkError,
        }
    }
}

/// Fieldless mirror of [`StreamError`], carried by exhausted-retry reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// See [`StreamError::AgeRestricted`]
    AgeRestricted,
    /// See [`StreamError::RegionBlocked`]
    RegionBlocked,
    /// See [`StreamError::Unavailable`]
    Unavailable,
    /// See [`StreamError::ProviderError`]
    ProviderError,
    /// See [`StreamError::NetworkError`]
    NetworkError,
}

impl FailureKind {
    /// Stable snake_case name for logs and event payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::AgeRestricted => "age_restricted",
            FailureKind::RegionBlocked => "region_blocked",
            FailureKind::Unavailable => "unavailable",
            FailureKind::ProviderError => "provider_error",
            FailureKind::NetworkError => "network_error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Download-related errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Every attempt failed; carries the last classified failure kind
    #[error("retries exhausted after {attempts} attempts (last failure: {kind})")]
    RetriesExhausted {
        /// Number of attempts made before giving up
        attempts: u32,
        /// The classification of the final failed attempt
        kind: FailureKind,
    },

    /// Item or collection metadata could not be fetched
    #[error("metadata fetch failed: {0}")]
    MetadataFetch(String),
}

/// Post-processing errors (conversion, tagging)
#[derive(Debug, Error)]
pub enum PostProcessError {
    /// External transcoder failed or exited non-zero
    #[error("conversion failed for {source_path}: {reason}")]
    ConversionFailed {
        /// The raw audio file that could not be converted
        source_path: PathBuf,
        /// The reason conversion failed
        reason: String,
    },

    /// Tag container could not be opened or written
    #[error("tagging failed for {path}: {reason}")]
    TaggingFailed {
        /// The converted file that could not be tagged
        path: PathBuf,
        /// The reason tagging failed
        reason: String,
    },

    /// File collision at destination
    #[error("file collision at {path}: {reason}")]
    FileCollision {
        /// The path where the collision occurred
        path: PathBuf,
        /// The reason for the collision (e.g., "file already exists")
        reason: String,
    },

    /// Path could not be decomposed into stem, extension, or parent
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The path that could not be processed
        path: PathBuf,
        /// The reason the path is invalid
        reason: String,
    },

    /// No usable transcoder binary was found
    #[error("transcoder unavailable: {reason}")]
    TranscoderUnavailable {
        /// Why conversion cannot run
        reason: String,
    },
}
