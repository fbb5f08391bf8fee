//! Audio format conversion handling
//!
//! This module provides a trait-based architecture for converting raw
//! downloaded audio into the configured output format. It supports a
//! CLI-based implementation (using an external ffmpeg binary) and a stub
//! implementation for graceful degradation when no converter is available.
//!
//! ## Architecture
//!
//! The core abstraction is the [`Transcoder`] trait, which defines the
//! conversion interface. Two implementations are provided:
//!
//! - [`CliTranscoder`]: Uses an external `ffmpeg` binary
//! - [`NoOpTranscoder`]: Stub implementation when ffmpeg is unavailable
//!
//! ## Usage
//!
//! ```no_run
//! use music_dl::transcode::{CliTranscoder, Transcoder};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Try to find ffmpeg in PATH
//!     let transcoder = CliTranscoder::from_path()
//!         .expect("ffmpeg binary not found");
//!
//!     // Convert a raw download into mp3
//!     transcoder
//!         .convert(Path::new("raw.webm"), Path::new("song.mp3"))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod cli;
mod noop;
mod traits;

pub use cli::CliTranscoder;
pub use noop::NoOpTranscoder;
pub use traits::Transcoder;
