//! Media provider collaborator seam
//!
//! The remote catalog/metadata provider is not implemented by this library.
//! Consumers supply a [`MediaProvider`] that, given an item handle, returns
//! title/author/publish-date/stream-list, and given a collection handle,
//! returns the ordered member handles. Every call is scoped to a
//! [`ProviderSession`] so the provider can vary its request fingerprint per
//! attempt.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::DownloadConfig;
use crate::profile::ClientProfile;
use crate::types::ItemHandle;

/// Per-attempt identity and transport scope for provider calls
///
/// Rebuilt for every resolution attempt so a rotated client profile takes
/// effect immediately.
#[derive(Clone, Debug)]
pub struct ProviderSession {
    /// Client identity profile for this attempt
    pub profile: ClientProfile,

    /// Whether to authenticate with OAuth credentials
    pub use_oauth: bool,

    /// Whether cached OAuth tokens may be reused
    pub allow_oauth_cache: bool,

    /// Proxy URL for http traffic, already gated on the proxy toggle
    pub http_proxy: Option<String>,

    /// Proxy URL for https traffic, already gated on the proxy toggle
    pub https_proxy: Option<String>,
}

impl ProviderSession {
    /// Build a session for one attempt from the download configuration.
    ///
    /// Proxy URLs are only carried over when `use_proxies` is set; providers
    /// and the resolver can use them unconditionally.
    pub fn from_config(profile: ClientProfile, config: &DownloadConfig) -> Self {
        let (http_proxy, https_proxy) = if config.use_proxies {
            (config.http_proxy.clone(), config.https_proxy.clone())
        } else {
            (None, None)
        };

        Self {
            profile,
            use_oauth: config.use_oauth,
            allow_oauth_cache: config.allow_oauth_cache,
            http_proxy,
            https_proxy,
        }
    }
}

/// One downloadable audio stream advertised by the provider
#[derive(Clone, Debug)]
pub struct AudioStream {
    /// Direct URL the stream payload can be fetched from
    pub url: String,

    /// MIME type of the payload (e.g. "audio/webm")
    pub mime_type: String,

    /// Average bitrate in kbit/s, when the provider reports one
    pub bitrate_kbps: Option<u32>,
}

impl AudioStream {
    /// File extension for the raw payload, derived from the MIME subtype.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "audio/webm" => "webm",
            "audio/mp4" => "m4a",
            "audio/mpeg" => "mp3",
            "audio/ogg" => "ogg",
            other => other.split('/').next_back().unwrap_or("bin"),
        }
    }
}

/// Metadata for a single item
#[derive(Clone, Debug)]
pub struct ItemInfo {
    /// Item title
    pub title: String,

    /// Uploading channel or author
    pub author: String,

    /// When the item was published, if known
    pub publish_date: Option<DateTime<Utc>>,

    /// Audio-only streams, best first
    pub audio_streams: Vec<AudioStream>,
}

/// Metadata for an ordered collection (playlist) of items
#[derive(Clone, Debug)]
pub struct CollectionInfo {
    /// Collection title
    pub title: String,

    /// Collection owner
    pub owner: String,

    /// When the collection was last updated, if known
    pub last_updated: Option<DateTime<Utc>>,

    /// Member items in collection order
    pub members: Vec<ItemHandle>,
}

/// Failures a provider may raise
///
/// This is the collaborator's own closed vocabulary; the stream resolver maps
/// it onto the library's internal failure kinds at the resolution boundary.
#[derive(Debug, Error)]
pub enum ProviderFailure {
    /// The item is age restricted for the session's client identity
    #[error("age restricted")]
    AgeRestricted,

    /// The item is not served in the session's region
    #[error("region blocked")]
    RegionBlocked,

    /// The item is gone, private, or has no usable stream
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The provider failed in some other way (extraction error, API change)
    #[error("{0}")]
    Other(String),

    /// The provider could not be reached
    #[error("network failure: {0}")]
    Network(String),
}

/// External metadata and stream provider
///
/// The library ships no production implementation; consumers wrap their
/// provider client of choice. Implementations must classify their failures
/// into [`ProviderFailure`] so the retry policy can branch on a stable
/// vocabulary.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Fetch metadata and the audio-only stream list for one item
    ///
    /// # Arguments
    ///
    /// * `session` - Identity and transport scope for this call
    /// * `item` - Source identifier for the item
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderFailure`] describing why the item could not be
    /// resolved. `AgeRestricted` is the only kind the retry policy responds
    /// to with an identity rotation.
    async fn fetch_item_info(
        &self,
        session: &ProviderSession,
        item: &ItemHandle,
    ) -> std::result::Result<ItemInfo, ProviderFailure>;

    /// Fetch metadata and the ordered member list for a collection
    ///
    /// # Arguments
    ///
    /// * `session` - Identity and transport scope for this call
    /// * `collection` - Source identifier for the collection
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderFailure`] when the collection cannot be resolved.
    async fn fetch_collection_info(
        &self,
        session: &ProviderSession,
        collection: &ItemHandle,
    ) -> std::result::Result<CollectionInfo, ProviderFailure>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
