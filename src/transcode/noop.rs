//! No-op transcoder for graceful degradation

use super::traits::Transcoder;
use crate::error::PostProcessError;
use async_trait::async_trait;
use std::path::Path;

/// No-op transcoder used when no ffmpeg binary is available
///
/// This handler is used when no external ffmpeg binary is configured and PATH
/// discovery finds none. Construction of the downloader still succeeds; the
/// first conversion attempt then fails with a
/// [`PostProcessError::TranscoderUnavailable`] carrying a hint on how to fix
/// the setup.
///
/// # Examples
///
/// ```
/// use music_dl::transcode::{NoOpTranscoder, Transcoder};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let transcoder = NoOpTranscoder;
///
/// let result = transcoder
///     .convert(Path::new("raw.webm"), Path::new("song.mp3"))
///     .await;
/// assert!(result.is_err());
/// # Ok(())
/// # }
/// ```
pub struct NoOpTranscoder;

#[async_trait]
impl Transcoder for NoOpTranscoder {
    async fn convert(&self, _source: &Path, _destination: &Path) -> crate::Result<()> {
        Err(crate::Error::PostProcess(
            PostProcessError::TranscoderUnavailable {
                reason: "audio conversion requires an external ffmpeg binary. \
                         Configure ffmpeg_path in config or ensure ffmpeg is in PATH."
                    .into(),
            },
        ))
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
