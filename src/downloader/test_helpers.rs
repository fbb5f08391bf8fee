//! Shared test doubles and fixtures for exercising download pipelines in tests.

use crate::config::Config;
use crate::db::Database;
use crate::downloader::MusicDownloader;
use crate::metadata::{AutomaticTagSource, TagSource};
use crate::post_process::AudioPostProcessor;
use crate::profile::{ClientProfile, ClientProfileRotator};
use crate::provider::{
    AudioStream, CollectionInfo, ItemInfo, MediaProvider, ProviderFailure, ProviderSession,
};
use crate::resolver::StreamResolver;
use crate::retry::DownloadAttemptPolicy;
use crate::scheduler::BatchScheduler;
use crate::transcode::Transcoder;
use crate::types::ItemHandle;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{tempdir, TempDir};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Provider double that replays a scripted sequence of item-info results.
///
/// Each `fetch_item_info` call pops the next scripted result and records the
/// session profile it was called with, so tests can assert both the retry
/// outcome and the identity used on every attempt. An exhausted script
/// answers with `ProviderFailure::Other`.
///
/// Calls can be held open with [`set_item_dwell`](Self::set_item_dwell); the
/// high-water mark of simultaneously open calls is then observable through
/// [`max_in_flight`](Self::max_in_flight), which is how scheduling tests tell
/// overlapping pipelines from serialized ones.
pub(crate) struct ScriptedProvider {
    item_results: Mutex<VecDeque<std::result::Result<ItemInfo, ProviderFailure>>>,
    collection: Mutex<Option<CollectionInfo>>,
    seen_profiles: Mutex<Vec<ClientProfile>>,
    item_dwell: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self {
            item_results: Mutex::new(VecDeque::new()),
            collection: Mutex::new(None),
            seen_profiles: Mutex::new(Vec::new()),
            item_dwell: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Queue the result the next `fetch_item_info` call returns.
    pub(crate) fn push_item_result(
        &self,
        result: std::result::Result<ItemInfo, ProviderFailure>,
    ) {
        self.item_results.lock().unwrap().push_back(result);
    }

    /// Fix the response for `fetch_collection_info`.
    pub(crate) fn set_collection(&self, info: CollectionInfo) {
        *self.collection.lock().unwrap() = Some(info);
    }

    /// Hold every `fetch_item_info` call open for `dwell` before answering.
    pub(crate) fn set_item_dwell(&self, dwell: Duration) {
        *self.item_dwell.lock().unwrap() = Some(dwell);
    }

    /// Profiles observed across `fetch_item_info` calls, in call order.
    pub(crate) fn seen_profiles(&self) -> Vec<ClientProfile> {
        self.seen_profiles.lock().unwrap().clone()
    }

    /// Largest number of `fetch_item_info` calls that were ever open at once.
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProvider for ScriptedProvider {
    async fn fetch_item_info(
        &self,
        session: &ProviderSession,
        _item: &ItemHandle,
    ) -> std::result::Result<ItemInfo, ProviderFailure> {
        let open_calls = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(open_calls, Ordering::SeqCst);
        self.seen_profiles.lock().unwrap().push(session.profile);

        let dwell = *self.item_dwell.lock().unwrap();
        if let Some(dwell) = dwell {
            tokio::time::sleep(dwell).await;
        }

        let result = self
            .item_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderFailure::Other("item script exhausted".to_string())));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn fetch_collection_info(
        &self,
        _session: &ProviderSession,
        _collection: &ItemHandle,
    ) -> std::result::Result<CollectionInfo, ProviderFailure> {
        self.collection
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ProviderFailure::Other("no collection scripted".to_string()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Item info carrying a single audio stream, for scripting successful attempts.
pub(crate) fn item_info_with_stream(title: &str, stream_url: &str, mime_type: &str) -> ItemInfo {
    ItemInfo {
        title: title.to_string(),
        author: "Scripted Artist".to_string(),
        publish_date: None,
        audio_streams: vec![AudioStream {
            url: stream_url.to_string(),
            mime_type: mime_type.to_string(),
            bitrate_kbps: Some(128),
        }],
    }
}

/// Transcoder double that copies the raw file to the destination unchanged.
pub(crate) struct CopyTranscoder;

#[async_trait]
impl Transcoder for CopyTranscoder {
    async fn convert(&self, source: &Path, destination: &Path) -> crate::Result<()> {
        tokio::fs::copy(source, destination).await?;
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "copy"
    }
}

/// Helper to create a test MusicDownloader over a scripted provider and a
/// copying transcoder. Returns the downloader, the provider for scripting,
/// and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader() -> (MusicDownloader, Arc<ScriptedProvider>, TempDir) {
    create_test_downloader_with(Config::default()).await
}

/// Same as [`create_test_downloader`], but over a caller-tweaked config.
/// Directory and database paths are rerooted into the tempdir regardless of
/// what the caller set.
pub(crate) async fn create_test_downloader_with(
    mut config: Config,
) -> (MusicDownloader, Arc<ScriptedProvider>, TempDir) {
    let temp_dir = tempdir().unwrap();
    config.persistence.database_path = temp_dir.path().join("test.db");
    config.download.working_dir = temp_dir.path().join("working");
    config.download.singles_dir = temp_dir.path().join("singles");
    config.download.albums_dir = temp_dir.path().join("albums");

    // Create download directories inside temp dir
    std::fs::create_dir_all(&config.download.working_dir).unwrap();
    std::fs::create_dir_all(&config.download.singles_dir).unwrap();
    std::fs::create_dir_all(&config.download.albums_dir).unwrap();

    // Initialize database
    let db = Arc::new(
        Database::new(&config.persistence.database_path)
            .await
            .unwrap(),
    );

    // Create broadcast channel
    let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

    let provider = Arc::new(ScriptedProvider::new());
    let config = Arc::new(config);

    // Assemble the pipeline by hand so the transcoder needs no external
    // binary and every provider call stays scripted
    let rotator = ClientProfileRotator::new();
    let resolver = StreamResolver::new(provider.clone(), config.download.working_dir.clone());
    let policy = DownloadAttemptPolicy::new(resolver, rotator.clone(), config.clone());
    let post = AudioPostProcessor::new(Arc::new(CopyTranscoder));
    let scheduler = BatchScheduler::new(policy, post, db.clone(), config.clone(), event_tx.clone());
    let tag_source: Arc<dyn TagSource> = Arc::new(AutomaticTagSource::new(provider.clone()));

    let downloader = MusicDownloader {
        db,
        event_tx,
        config,
        tag_source,
        rotator,
        scheduler,
    };

    (downloader, provider, temp_dir)
}

/// Start a server answering every GET with the taggable mp3 fixture.
pub(crate) async fn audio_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mp3_fixture()))
        .mount(&server)
        .await;
    server
}

/// Minimal mp3: ID3v2.3 header, a TALB frame ("aaaaaaaaaaa" in UTF-16LE),
/// and two complete MPEG frames so tag readers accept the file.
pub(crate) fn mp3_fixture() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0x49, 0x44, 0x33, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x23]);
    bytes.extend_from_slice(&[
        0x54, 0x41, 0x4C, 0x42, 0x00, 0x00, 0x00, 0x19, 0x00, 0x00, 0x01, 0xFF, 0xFE, 0x61,
        0x00, 0x61, 0x00, 0x61, 0x00, 0x61, 0x00, 0x61, 0x00, 0x61, 0x00, 0x61, 0x00, 0x61,
        0x00, 0x61, 0x00, 0x61, 0x00, 0x61, 0x00,
    ]);
    // Two MPEG1 Layer III frames (64 kbps @ 44.1 kHz => 208 bytes each),
    // zero-padded to their full declared length
    let audio_start = bytes.len();
    bytes.extend_from_slice(&[
        0xFF, 0xFB, 0x50, 0xC4, 0x00, 0x03, 0xC0, 0x00, 0x01, 0xA4, 0x00, 0x00, 0x00, 0x20,
        0x00, 0x00, 0x34, 0x80, 0x00, 0x00, 0x04,
    ]);
    bytes.resize(audio_start + 208, 0x00);
    bytes.extend_from_slice(&[0xFF, 0xFB, 0x50, 0xC4]);
    bytes.resize(audio_start + 416, 0x00);
    bytes
}
