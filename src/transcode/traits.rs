//! Trait for audio format conversion

use async_trait::async_trait;
use std::path::Path;

/// Trait for converting raw audio into the target output format
///
/// This trait defines the interface for the conversion step of the
/// post-processing pipeline. Implementations can shell out to an external
/// binary or provide stub functionality for graceful degradation when no
/// converter is available.
///
/// # Examples
///
/// ```no_run
/// use music_dl::transcode::{CliTranscoder, Transcoder};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let transcoder = CliTranscoder::from_path()
///     .expect("ffmpeg not found in PATH");
///
/// transcoder
///     .convert(Path::new("raw.webm"), Path::new("song.mp3"))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Convert a raw audio file into the destination format
    ///
    /// The output format is chosen by the destination path's extension.
    ///
    /// # Arguments
    ///
    /// * `source` - Path to the raw audio file
    /// * `destination` - Path the converted file should be written to
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The external binary fails to start (for CLI implementations)
    /// - The conversion exits with a failure status
    /// - The operation is not supported (for stub implementations)
    async fn convert(&self, source: &Path, destination: &Path) -> crate::Result<()>;

    /// Whether this handler can actually run conversions
    ///
    /// Stub implementations return `false` so startup logging can announce
    /// degraded mode before the first conversion fails.
    fn is_available(&self) -> bool;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
