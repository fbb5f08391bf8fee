//! # music-dl
//!
//! Backend library for ripping audio from streaming platforms into tagged,
//! cataloged music files.
//!
//! ## Design Philosophy
//!
//! music-dl is designed to be:
//! - **Provider-agnostic** - All platform access goes through the
//!   [`MediaProvider`] trait; no scraping logic lives in this crate
//! - **Resilient** - Failed downloads retry under rotating client identities
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use music_dl::{Config, MusicDownloader};
//! use std::sync::Arc;
//!
//! # fn make_provider() -> Arc<dyn music_dl::MediaProvider> { unimplemented!() }
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let provider = make_provider();
//!
//!     let downloader = MusicDownloader::new(config, provider).await?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let path = downloader
//!         .download_song("https://music.example.com/watch?v=dQw4w9WgXcQ")
//!         .await?;
//!     println!("Saved to {}", path.display());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Song catalog persistence layer
pub mod db;
/// Core downloader facade
pub mod downloader;
/// Error types
pub mod error;
/// Tag assembly and the tag source seam
pub mod metadata;
/// Output path construction and collision handling
pub mod naming;
/// Conversion and tagging of downloaded audio
pub mod post_process;
/// Client identity profiles and rotation
pub mod profile;
/// Media platform access traits and session types
pub mod provider;
/// Stream selection and raw payload retrieval
pub mod resolver;
/// Retry logic with identity rotation
pub mod retry;
/// Batch scheduling across download pipelines
pub mod scheduler;
/// External audio transcoder integration
pub mod transcode;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, FileCollisionAction, TagMode};
pub use db::Database;
pub use downloader::MusicDownloader;
pub use error::{
    DatabaseError, DownloadError, Error, FailureKind, PostProcessError, Result, StreamError,
};
pub use metadata::{AlbumTags, AutomaticTagSource, TagSource};
pub use profile::{ClientProfile, ClientProfileRotator};
pub use provider::{
    AudioStream, CollectionInfo, ItemInfo, MediaProvider, ProviderFailure, ProviderSession,
};
pub use scheduler::BatchScheduler;
pub use transcode::{CliTranscoder, NoOpTranscoder, Transcoder};
pub use types::{DownloadJob, Event, ItemHandle, JobOutcome, TagRecord};
