//! A registry-backed media provider and audio fixtures for end-to-end tests

use async_trait::async_trait;
use music_dl::{
    AudioStream, CollectionInfo, ItemHandle, ItemInfo, MediaProvider, ProviderFailure,
    ProviderSession,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// In-memory media platform
///
/// Items and collections are registered up front and served to the downloader
/// through the public provider trait, so the whole pipeline runs without
/// touching a real streaming site. Lookups are idempotent: the same item
/// answers the tag fetch and every download attempt.
pub struct FakePlatform {
    items: Mutex<HashMap<ItemHandle, ItemInfo>>,
    collections: Mutex<HashMap<ItemHandle, CollectionInfo>>,
    item_dwell: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            collections: Mutex::new(HashMap::new()),
            item_dwell: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Register an item the platform will answer for
    pub fn add_item(&self, handle: &str, info: ItemInfo) {
        self.items
            .lock()
            .unwrap()
            .insert(ItemHandle::from(handle), info);
    }

    /// Register a collection with the given members
    pub fn add_collection(&self, handle: &str, title: &str, owner: &str, members: &[&str]) {
        self.collections.lock().unwrap().insert(
            ItemHandle::from(handle),
            CollectionInfo {
                title: title.to_string(),
                owner: owner.to_string(),
                last_updated: None,
                members: members.iter().map(|m| ItemHandle::from(*m)).collect(),
            },
        );
    }

    /// Hold every item lookup open for `dwell` before answering
    pub fn set_item_dwell(&self, dwell: Duration) {
        *self.item_dwell.lock().unwrap() = Some(dwell);
    }

    /// Largest number of item lookups that were ever open at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaProvider for FakePlatform {
    async fn fetch_item_info(
        &self,
        _session: &ProviderSession,
        item: &ItemHandle,
    ) -> Result<ItemInfo, ProviderFailure> {
        let open_calls = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(open_calls, Ordering::SeqCst);

        let dwell = *self.item_dwell.lock().unwrap();
        if let Some(dwell) = dwell {
            tokio::time::sleep(dwell).await;
        }

        let result = self
            .items
            .lock()
            .unwrap()
            .get(item)
            .cloned()
            .ok_or_else(|| ProviderFailure::Unavailable(format!("unknown item: {}", item)));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn fetch_collection_info(
        &self,
        _session: &ProviderSession,
        collection: &ItemHandle,
    ) -> Result<CollectionInfo, ProviderFailure> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .ok_or_else(|| ProviderFailure::Unavailable(format!("unknown collection: {}", collection)))
    }

    fn name(&self) -> &'static str {
        "fake-platform"
    }
}

/// Item info carrying one wav stream at `stream_url`
pub fn wav_item(title: &str, artist: &str, stream_url: &str) -> ItemInfo {
    ItemInfo {
        title: title.to_string(),
        author: artist.to_string(),
        publish_date: None,
        audio_streams: vec![AudioStream {
            url: stream_url.to_string(),
            mime_type: "audio/wav".to_string(),
            bitrate_kbps: Some(256),
        }],
    }
}

/// Start a server answering every GET with the wav fixture
pub async fn serve_wav() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(wav_fixture()))
        .mount(&server)
        .await;
    server
}

/// 0.1 seconds of 8kHz 16-bit mono PCM silence in a RIFF container.
/// Valid input for ffmpeg and for tag readers alike.
pub fn wav_fixture() -> Vec<u8> {
    let data_len = 1600u32;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&8000u32.to_le_bytes());
    bytes.extend_from_slice(&16000u32.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(bytes.len() + data_len as usize, 0);
    bytes
}
