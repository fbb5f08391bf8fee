//! End-to-end pipeline tests with a real ffmpeg binary
//!
//! These exercise the whole chain through the public API: provider fetch,
//! payload download, conversion via the discovered ffmpeg, tagging, and the
//! catalog write. Tests skip themselves when no ffmpeg is in PATH.
//!
//! ```bash
//! cargo test --test e2e_pipeline
//! ```

mod common;

use common::{create_downloader, create_sequential_downloader, serve_wav, wav_item, FakePlatform};
use lofty::file::TaggedFileExt;
use lofty::prelude::Accessor;
use lofty::read_from_path;
use music_dl::{Event, JobOutcome};
use std::sync::Arc;

// ============================================================================
// Single Downloads
// ============================================================================

/// A single download ends as a tagged audio file in the singles directory
#[tokio::test]
async fn single_download_produces_a_tagged_cataloged_file() {
    skip_if_no_ffmpeg!();

    let server = serve_wav().await;
    let platform = Arc::new(FakePlatform::new());
    platform.add_item(
        "watch-v-solo",
        wav_item("Solo Flight", "Ada Jet", &format!("{}/solo.wav", server.uri())),
    );

    let (downloader, _temp_dir) = create_downloader(platform).await.unwrap();
    let mut events = downloader.subscribe();

    let path = downloader.download_song("watch-v-solo").await.unwrap();

    // The output landed under singles with the source embedded in the name
    assert!(path.is_file());
    assert!(path.starts_with(downloader.get_config().singles_dir()));
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("watch-v-solo - Solo Flight.wav")
    );

    // ffmpeg re-encoded the payload rather than copying it through
    assert!(std::fs::metadata(&path).unwrap().len() > 0);

    // Tags are embedded in the output container
    let tagged = read_from_path(&path).unwrap();
    let tag = tagged.primary_tag().unwrap();
    assert_eq!(tag.title().as_deref(), Some("Solo Flight"));
    assert_eq!(tag.artist().as_deref(), Some("Ada Jet"));

    // Provenance is in the catalog
    let songs = downloader.db.list_songs().await.unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].source_url, "watch-v-solo");
    assert_eq!(songs[0].title.as_deref(), Some("Solo Flight"));

    // The batch lifecycle was observable
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen
        .iter()
        .any(|e| matches!(e, Event::JobCompleted { .. })));
    assert!(matches!(
        seen.last(),
        Some(Event::BatchCompleted {
            succeeded: 1,
            failed: 0
        })
    ));
}

// ============================================================================
// Album Downloads
// ============================================================================

/// An album download produces a numbered, tagged directory of tracks
#[tokio::test]
async fn album_download_produces_a_numbered_tagged_directory() {
    skip_if_no_ffmpeg!();

    let server = serve_wav().await;
    let platform = Arc::new(FakePlatform::new());
    platform.add_collection(
        "playlist-voyage",
        "Night Voyage",
        "Ada Jet",
        &["member-a", "member-b"],
    );
    platform.add_item(
        "member-a",
        wav_item("Departure", "Ada Jet", &format!("{}/a.wav", server.uri())),
    );
    platform.add_item(
        "member-b",
        wav_item("Arrival", "Ada Jet", &format!("{}/b.wav", server.uri())),
    );

    let (downloader, _temp_dir) = create_sequential_downloader(platform).await.unwrap();
    let outcomes = downloader.download_album("playlist-voyage").await.unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(JobOutcome::is_success));

    let album_dir = downloader
        .get_config()
        .albums_dir()
        .join("Ada Jet - Night Voyage");
    let first = album_dir.join("1. Departure.wav");
    let second = album_dir.join("2. Arrival.wav");
    assert!(first.is_file());
    assert!(second.is_file());

    // Track numbering and album context are embedded in each file
    let tagged = read_from_path(&second).unwrap();
    let tag = tagged.primary_tag().unwrap();
    assert_eq!(tag.title().as_deref(), Some("Arrival"));
    assert_eq!(tag.album().as_deref(), Some("Night Voyage"));
    assert_eq!(tag.track(), Some(2));

    // Catalog rows follow collection order
    let songs = downloader.db.list_songs().await.unwrap();
    let cataloged: Vec<&str> = songs.iter().map(|s| s.source_url.as_str()).collect();
    assert_eq!(cataloged, ["member-a", "member-b"]);
    assert_eq!(songs[0].track_num, Some(1));
    assert_eq!(songs[1].track_num, Some(2));

    // The working directory holds no leftovers once conversions land
    let working = downloader.get_config().working_dir().to_path_buf();
    assert_eq!(std::fs::read_dir(working).unwrap().count(), 0);
}
