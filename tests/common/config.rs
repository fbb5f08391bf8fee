//! Configuration helpers for creating end-to-end test downloaders

use music_dl::{CliTranscoder, Config, MediaProvider, MusicDownloader, Result};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Check whether an ffmpeg binary is reachable for full-pipeline tests
pub fn has_ffmpeg() -> bool {
    CliTranscoder::from_path().is_some()
}

/// Skip test if no ffmpeg binary is available
#[macro_export]
macro_rules! skip_if_no_ffmpeg {
    () => {
        if !$crate::common::has_ffmpeg() {
            eprintln!("Skipping test: ffmpeg not found in PATH");
            return;
        }
    };
}

/// Base configuration rooted under `root`
///
/// The output format is wav so conversions stay inside ffmpeg's built-in
/// codecs; no external encoder has to be installed on the test machine.
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.persistence.database_path = root.join("test.db");
    config.download.working_dir = root.join("working");
    config.download.singles_dir = root.join("singles");
    config.download.albums_dir = root.join("albums");
    config.tools.audio_format = "wav".to_string();
    config
}

/// Create a MusicDownloader rooted in a fresh temp directory
///
/// Returns the downloader and temp directory (keep temp_dir alive for the
/// test duration)
pub async fn create_downloader(
    provider: Arc<dyn MediaProvider>,
) -> Result<(MusicDownloader, TempDir)> {
    let temp_dir = tempfile::tempdir()?;
    let config = test_config(temp_dir.path());
    let downloader = MusicDownloader::new(config, provider).await?;
    Ok((downloader, temp_dir))
}

/// Create a downloader that runs its batches one pipeline at a time
pub async fn create_sequential_downloader(
    provider: Arc<dyn MediaProvider>,
) -> Result<(MusicDownloader, TempDir)> {
    let temp_dir = tempfile::tempdir()?;
    let mut config = test_config(temp_dir.path());
    config.download.download_concurrently = false;
    let downloader = MusicDownloader::new(config, provider).await?;
    Ok((downloader, temp_dir))
}

/// Create a downloader with transcoder discovery disabled, for exercising
/// degraded operation without ffmpeg
pub async fn create_noop_downloader(
    provider: Arc<dyn MediaProvider>,
) -> Result<(MusicDownloader, TempDir)> {
    let temp_dir = tempfile::tempdir()?;
    let mut config = test_config(temp_dir.path());
    config.tools.search_path = false;
    let downloader = MusicDownloader::new(config, provider).await?;
    Ok((downloader, temp_dir))
}

/// Create a downloader that sleeps between successive pipeline launches
pub async fn create_paced_downloader(
    provider: Arc<dyn MediaProvider>,
    delay_ms: u64,
) -> Result<(MusicDownloader, TempDir)> {
    let temp_dir = tempfile::tempdir()?;
    let mut config = test_config(temp_dir.path());
    config.tools.search_path = false;
    config.download.add_delay_between_downloads = true;
    config.download.delay_length_ms = delay_ms;
    let downloader = MusicDownloader::new(config, provider).await?;
    Ok((downloader, temp_dir))
}
