//! The [`MusicDownloader`] facade: owns the configuration, the song catalog,
//! the pipeline components, and the event channel, and exposes the
//! `download_song`/`download_album` entry points.

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use crate::config::{Config, TagMode};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::metadata::{AutomaticTagSource, TagSource};
use crate::naming;
use crate::post_process::AudioPostProcessor;
use crate::profile::ClientProfileRotator;
use crate::provider::{MediaProvider, ProviderSession};
use crate::resolver::StreamResolver;
use crate::retry::DownloadAttemptPolicy;
use crate::scheduler::BatchScheduler;
use crate::transcode::{CliTranscoder, NoOpTranscoder, Transcoder};
use crate::types::{DownloadJob, Event, ItemHandle, JobOutcome};
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Main downloader instance (cloneable; clones share all underlying state)
#[derive(Clone)]
pub struct MusicDownloader {
    /// Database instance for the song catalog
    /// Public so embedding applications and integration tests can query it
    pub db: Arc<Database>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Tag source selected by the configured tag mode
    pub(crate) tag_source: Arc<dyn TagSource>,
    /// Client identity rotator shared with every download attempt
    pub(crate) rotator: ClientProfileRotator,
    /// Batch scheduler over the shared pipeline components
    pub(crate) scheduler: BatchScheduler,
}

impl MusicDownloader {
    /// Create a new MusicDownloader instance
    ///
    /// This initializes all core components:
    /// - Creates the working, singles, and albums directories
    /// - Opens/creates the SQLite catalog and runs migrations
    /// - Selects the transcoder (explicit `ffmpeg_path`, else PATH discovery)
    /// - Sets up the event broadcast channel
    ///
    /// Tags are produced per the configured tag mode; `automatic` assembles
    /// them from provider metadata. The `manual` mode requires a
    /// caller-supplied source, see [`with_tag_source`](Self::with_tag_source).
    ///
    /// # Errors
    ///
    /// Fails when a configured directory or the catalog cannot be created,
    /// or with a configuration error when the tag mode is `manual`.
    pub async fn new(config: Config, provider: Arc<dyn MediaProvider>) -> Result<Self> {
        Self::build(config, provider, None).await
    }

    /// Create a MusicDownloader with a caller-supplied tag source
    ///
    /// This is how the `manual` tag mode is satisfied: the consumer
    /// implements [`TagSource`] (interactive prompting, a local database,
    /// anything) and hands it in here. A supplied source is used regardless
    /// of the configured tag mode.
    ///
    /// # Errors
    ///
    /// Fails when a configured directory or the catalog cannot be created.
    pub async fn with_tag_source(
        config: Config,
        provider: Arc<dyn MediaProvider>,
        tag_source: Arc<dyn TagSource>,
    ) -> Result<Self> {
        Self::build(config, provider, Some(tag_source)).await
    }

    async fn build(
        config: Config,
        provider: Arc<dyn MediaProvider>,
        supplied: Option<Arc<dyn TagSource>>,
    ) -> Result<Self> {
        // Resolve the tag source before touching the filesystem; a manual
        // mode without a source can never produce a working downloader
        let tag_source: Arc<dyn TagSource> = match (config.tagging.tag_mode, supplied) {
            (_, Some(source)) => source,
            (TagMode::Automatic, None) => Arc::new(AutomaticTagSource::new(provider.clone())),
            (TagMode::Manual, None) => {
                return Err(Error::Config {
                    message: "tag_mode is manual but no tag source was supplied; \
                              construct with with_tag_source"
                        .to_string(),
                    key: Some("tag_mode".to_string()),
                });
            }
        };

        // Ensure the download directory layout exists
        ensure_dir(config.working_dir(), "working").await?;
        ensure_dir(config.singles_dir(), "singles").await?;
        ensure_dir(config.albums_dir(), "albums").await?;

        // Initialize the catalog
        let db = Database::new(&config.persistence.database_path).await?;
        info!(
            path = %config.database_path().display(),
            "Catalog opened"
        );

        // Create broadcast channel with buffer size of 1000 events, so
        // multiple subscribers receive all events independently
        let (event_tx, _rx) = broadcast::channel(1000);

        // Select the transcoder: an explicit path wins, then PATH discovery;
        // otherwise the first conversion fails with a pointed error
        let transcoder: Arc<dyn Transcoder> =
            if let Some(ref ffmpeg_path) = config.tools.ffmpeg_path {
                Arc::new(CliTranscoder::new(ffmpeg_path.clone()))
            } else if config.tools.search_path {
                CliTranscoder::from_path()
                    .map(|t| Arc::new(t) as Arc<dyn Transcoder>)
                    .unwrap_or_else(|| Arc::new(NoOpTranscoder))
            } else {
                Arc::new(NoOpTranscoder)
            };

        info!(
            transcoder = transcoder.name(),
            available = transcoder.is_available(),
            "Transcoder initialized"
        );

        let db = Arc::new(db);
        let config = Arc::new(config);

        // Assemble the pipeline; the rotator is shared so every attempt in
        // every job observes one identity sequence
        let rotator = ClientProfileRotator::new();
        let resolver = StreamResolver::new(provider, config.download.working_dir.clone());
        let policy = DownloadAttemptPolicy::new(resolver, rotator.clone(), config.clone());
        let post = AudioPostProcessor::new(transcoder);
        let scheduler = BatchScheduler::new(
            policy,
            post,
            db.clone(),
            config.clone(),
            event_tx.clone(),
        );

        Ok(Self {
            db,
            event_tx,
            config,
            tag_source,
            rotator,
            scheduler,
        })
    }

    /// Download one item as a standalone single
    ///
    /// Tags are fetched first, the destination filename embeds the source
    /// URL and the title, and the job runs through a one-element batch, so
    /// its catalog row is written before the download starts.
    ///
    /// # Errors
    ///
    /// Fails when tags cannot be fetched, or with the job's terminal error
    /// when its pipeline fails.
    pub async fn download_song(&self, url: impl Into<ItemHandle>) -> Result<PathBuf> {
        let item = url.into();
        let session = self.session();
        let tags = self.tag_source.song_tags(&session, &item, None).await?;

        let title = tags.title.as_deref().unwrap_or_default();
        let filename = naming::single_filename(item.as_str(), title, self.config.audio_format());
        let destination = self.config.singles_dir().join(filename);

        info!(item = %item, destination = %destination.display(), "Starting song download");
        let job = DownloadJob::new(item, destination, tags);
        let outcomes = self.scheduler.run_batch(vec![job]).await;

        outcomes
            .into_iter()
            .next()
            .map(|outcome| outcome.result)
            .unwrap_or_else(|| Err(Error::Other("batch produced no outcome".to_string())))
    }

    /// Download every member of a collection into an album directory
    ///
    /// Album context is fetched once; members are numbered 1..N in
    /// collection enumeration order, and that numbering is fixed before any
    /// pipeline starts, so output filenames are deterministic regardless of
    /// completion order. The album lands in a `"<artist> - <title>"`
    /// directory under the configured albums root. Jobs run as one batch
    /// under the configured pacing mode.
    ///
    /// # Errors
    ///
    /// Fails when the collection or any member's tags cannot be fetched; no
    /// job runs in that case. Per-job download failures do not fail the
    /// call, they surface in the returned outcomes.
    pub async fn download_album(&self, url: impl Into<ItemHandle>) -> Result<Vec<JobOutcome>> {
        let collection = url.into();
        let session = self.session();
        let album = self.tag_source.album_tags(&session, &collection).await?;

        let album_dir = self
            .config
            .albums_dir()
            .join(naming::album_dir_name(&album.artist, &album.title));
        ensure_dir(&album_dir, "album").await?;

        let members = album.members.clone();
        info!(
            collection = %collection,
            album = %album.title,
            tracks = members.len(),
            "Starting album download"
        );

        let mut jobs = Vec::with_capacity(members.len());
        for (index, member) in members.into_iter().enumerate() {
            let track_num = index as u32 + 1;
            let mut tags = self
                .tag_source
                .song_tags(&session, &member, Some(&album))
                .await?;
            // Position in the collection wins over whatever the tag source
            // looked up, so a member listed twice still gets two distinct,
            // contiguous numbers
            tags.track_num = Some(track_num);

            let title = tags.title.as_deref().unwrap_or_default();
            let filename =
                naming::album_track_filename(track_num, title, self.config.audio_format());
            jobs.push(DownloadJob::new(member, album_dir.join(filename), tags));
        }

        Ok(self.scheduler.run_batch(jobs).await)
    }

    /// Subscribe to downloader events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. Events are buffered, but a subscriber that falls
    /// behind by more than 1000 events receives a `RecvError::Lagged`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use music_dl::MusicDownloader;
    /// # async fn example(downloader: &MusicDownloader) {
    /// let mut events = downloader.subscribe();
    /// tokio::spawn(async move {
    ///     while let Ok(event) = events.recv().await {
    ///         println!("{:?}", event);
    ///     }
    /// });
    /// # }
    /// ```
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    ///
    /// The configuration is wrapped in an Arc, so this is a cheap clone.
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Session bundle for facade-level metadata fetches, scoped to the
    /// rotator's currently active identity
    fn session(&self) -> ProviderSession {
        ProviderSession::from_config(self.rotator.current(), &self.config.download)
    }
}

/// Create a directory and its parents, labeling failures with which
/// configured root could not be created
async fn ensure_dir(path: &Path, what: &str) -> Result<()> {
    tokio::fs::create_dir_all(path).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!(
                "Failed to create {} directory '{}': {}",
                what,
                path.display(),
                e
            ),
        ))
    })
}
