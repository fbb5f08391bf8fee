//! Stream resolution: one metadata fetch plus one raw audio download
//!
//! A [`StreamResolver`] performs a single download attempt. It asks the
//! [`MediaProvider`] for the item's audio stream list under a given session
//! identity, picks the first audio-only stream, and pulls its bytes down to a
//! raw file in the working directory. Every failure is classified into one of
//! the five [`StreamError`] kinds so the retry policy can branch on it.

use crate::error::StreamError;
use crate::naming;
use crate::provider::{AudioStream, MediaProvider, ProviderFailure, ProviderSession};
use crate::types::ItemHandle;
use futures::StreamExt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Resolves an item to a raw audio file on disk
///
/// Cheap to clone; the provider is shared behind an `Arc`.
#[derive(Clone)]
pub struct StreamResolver {
    provider: Arc<dyn MediaProvider>,
    working_dir: PathBuf,
}

impl StreamResolver {
    /// Create a resolver that writes raw files under `working_dir`
    #[must_use]
    pub fn new(provider: Arc<dyn MediaProvider>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            working_dir: working_dir.into(),
        }
    }

    /// Resolve one item under the given session identity and download its
    /// audio to a raw file in the working directory
    ///
    /// Selects the first audio-only stream the provider reports. On failure no
    /// partial file is guaranteed to remain; a later attempt for the same item
    /// overwrites whatever an earlier one left behind.
    ///
    /// # Errors
    ///
    /// Every failure maps to exactly one [`StreamError`] kind: provider
    /// failures 1:1 through their own taxonomy, transport and disk failures
    /// during the transfer as `NetworkError`, an empty stream list as
    /// `Unavailable`.
    pub async fn resolve(
        &self,
        session: &ProviderSession,
        item: &ItemHandle,
    ) -> std::result::Result<PathBuf, StreamError> {
        let info = self
            .provider
            .fetch_item_info(session, item)
            .await
            .map_err(classify)?;

        let stream = info
            .audio_streams
            .first()
            .ok_or_else(|| StreamError::Unavailable("no audio-only stream available".to_string()))?;

        debug!(
            item = %item,
            title = %info.title,
            mime_type = %stream.mime_type,
            bitrate_kbps = ?stream.bitrate_kbps,
            "Selected audio stream"
        );

        let raw_path = self.raw_path_for(item, stream);
        self.download_stream(session, stream, &raw_path).await?;

        info!(item = %item, path = %raw_path.display(), "Raw audio downloaded");
        Ok(raw_path)
    }

    /// Raw file location for an item. The name carries a hash of the raw
    /// handle alongside its sanitized form: sanitization can map distinct
    /// handles to the same text, and concurrent jobs must never share a
    /// working file. The hash is deterministic, so a reattempt for the same
    /// item reuses the same path.
    fn raw_path_for(&self, item: &ItemHandle, stream: &AudioStream) -> PathBuf {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        item.as_str().hash(&mut hasher);
        let filename = format!(
            "{}-{:016x}.{}",
            naming::sanitize_component(item.as_str()),
            hasher.finish(),
            stream.extension()
        );
        self.working_dir.join(filename)
    }

    /// Stream the audio bytes to disk chunk by chunk
    async fn download_stream(
        &self,
        session: &ProviderSession,
        stream: &AudioStream,
        destination: &Path,
    ) -> std::result::Result<(), StreamError> {
        let client = build_http_client(session)?;

        let response = client
            .get(&stream.url)
            .send()
            .await
            .map_err(|e| StreamError::NetworkError(format!("stream request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(StreamError::NetworkError(format!(
                "stream request returned HTTP {}",
                response.status()
            )));
        }

        let mut file = tokio::fs::File::create(destination).await.map_err(|e| {
            StreamError::NetworkError(format!(
                "failed to create {}: {}",
                destination.display(),
                e
            ))
        })?;

        let mut byte_stream = response.bytes_stream();
        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = chunk_result
                .map_err(|e| StreamError::NetworkError(format!("stream interrupted: {}", e)))?;
            file.write_all(&chunk).await.map_err(|e| {
                StreamError::NetworkError(format!(
                    "failed to write {}: {}",
                    destination.display(),
                    e
                ))
            })?;
        }

        file.flush().await.map_err(|e| {
            StreamError::NetworkError(format!("failed to flush {}: {}", destination.display(), e))
        })?;

        Ok(())
    }
}

/// Build an HTTP client scoped to one session's proxy settings
fn build_http_client(
    session: &ProviderSession,
) -> std::result::Result<reqwest::Client, StreamError> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(30))
        .user_agent("music-dl audio fetcher");

    if let Some(ref proxy_url) = session.http_proxy {
        let proxy = reqwest::Proxy::http(proxy_url)
            .map_err(|e| StreamError::NetworkError(format!("invalid http proxy: {}", e)))?;
        builder = builder.proxy(proxy);
    }

    if let Some(ref proxy_url) = session.https_proxy {
        let proxy = reqwest::Proxy::https(proxy_url)
            .map_err(|e| StreamError::NetworkError(format!("invalid https proxy: {}", e)))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| StreamError::NetworkError(format!("failed to create HTTP client: {}", e)))
}

/// Map provider failures onto the resolver's failure vocabulary 1:1
fn classify(failure: ProviderFailure) -> StreamError {
    match failure {
        ProviderFailure::AgeRestricted => StreamError::AgeRestricted,
        ProviderFailure::RegionBlocked => StreamError::RegionBlocked,
        ProviderFailure::Unavailable(msg) => StreamError::Unavailable(msg),
        ProviderFailure::Other(msg) => StreamError::ProviderError(msg),
        ProviderFailure::Network(msg) => StreamError::NetworkError(msg),
    }
}
