//! CLI-based transcoder using external ffmpeg binary

use super::traits::Transcoder;
use crate::error::PostProcessError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// CLI-based transcoder using external ffmpeg binary
///
/// This handler executes the external `ffmpeg` binary to convert raw audio
/// into the configured output format. The invocation keeps ffmpeg quiet
/// (`-hide_banner -loglevel error`) so stderr carries only real failure text,
/// which becomes the conversion error's reason.
///
/// # Examples
///
/// ```no_run
/// use music_dl::transcode::{CliTranscoder, Transcoder};
/// use std::path::{Path, PathBuf};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Create with explicit path
/// let transcoder = CliTranscoder::new(PathBuf::from("/usr/bin/ffmpeg"));
///
/// // Or auto-discover from PATH
/// let transcoder = CliTranscoder::from_path()
///     .expect("ffmpeg not found in PATH");
///
/// transcoder
///     .convert(Path::new("raw.webm"), Path::new("song.mp3"))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct CliTranscoder {
    binary_path: PathBuf,
}

impl CliTranscoder {
    /// Create a new CLI transcoder with an explicit binary path
    ///
    /// # Arguments
    ///
    /// * `binary_path` - Path to the ffmpeg binary
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find ffmpeg in PATH
    ///
    /// Uses the `which` crate to search for the `ffmpeg` binary in the system
    /// PATH.
    ///
    /// # Returns
    ///
    /// `Some(CliTranscoder)` if the binary is found, `None` otherwise.
    pub fn from_path() -> Option<Self> {
        which::which("ffmpeg").ok().map(Self::new)
    }
}

#[async_trait]
impl Transcoder for CliTranscoder {
    async fn convert(&self, source: &Path, destination: &Path) -> crate::Result<()> {
        let output = Command::new(&self.binary_path)
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(source)
            .arg(destination)
            .output()
            .await
            .map_err(|e| crate::Error::ExternalTool(format!("Failed to execute ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = if stderr.trim().is_empty() {
                format!("ffmpeg exited with {}", output.status)
            } else {
                stderr.trim().to_string()
            };
            return Err(crate::Error::PostProcess(
                PostProcessError::ConversionFailed {
                    source_path: source.to_path_buf(),
                    reason,
                },
            ));
        }

        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "cli-ffmpeg"
    }
}
