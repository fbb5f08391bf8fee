//! Batch scheduling: catalog writes first, then fan-out of download pipelines
//!
//! A batch runs in two phases. Every job's tags are written to the catalog in
//! enumeration order before any download starts, so provenance exists even
//! for items whose audio never arrives. Pipelines then run either
//! concurrently (spawned together, with optional pacing between launches) or
//! strictly one at a time. One job's failure never cancels its siblings, and
//! outcomes come back in job order regardless of completion order.

use crate::config::Config;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::naming;
use crate::post_process::AudioPostProcessor;
use crate::retry::DownloadAttemptPolicy;
use crate::types::{DownloadJob, Event, ItemHandle, JobOutcome};
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

/// Fans a batch of jobs out across full download pipelines
///
/// Cloneable; clones share the catalog handle, the retry policy (and through
/// it the client profile rotator), and the event channel, so every pipeline
/// spawned from any clone observes the same identity sequence and reports to
/// the same subscribers.
#[derive(Clone)]
pub struct BatchScheduler {
    policy: DownloadAttemptPolicy,
    post: AudioPostProcessor,
    db: Arc<Database>,
    config: Arc<Config>,
    event_tx: broadcast::Sender<Event>,
}

impl BatchScheduler {
    /// Create a scheduler over the shared pipeline components
    #[must_use]
    pub fn new(
        policy: DownloadAttemptPolicy,
        post: AudioPostProcessor,
        db: Arc<Database>,
        config: Arc<Config>,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            policy,
            post,
            db,
            config,
            event_tx,
        }
    }

    /// Run every job through the full download pipeline
    ///
    /// Catalog rows are written for all jobs, in job order, before the first
    /// pipeline launches; a failed catalog write is logged and the job still
    /// runs. Returns one outcome per job, in job order, regardless of
    /// completion order. Lifecycle events are broadcast throughout; a missing
    /// or lagging subscriber never blocks the batch.
    pub async fn run_batch(&self, jobs: Vec<DownloadJob>) -> Vec<JobOutcome> {
        let concurrent = self.config.download.download_concurrently;
        info!(total = jobs.len(), concurrent, "Starting batch");
        self.event_tx
            .send(Event::BatchStarted {
                total: jobs.len(),
                concurrent,
            })
            .ok();

        self.record_batch(&jobs).await;

        let outcomes = if concurrent {
            self.run_concurrent(jobs).await
        } else {
            self.run_sequential(jobs).await
        };

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = outcomes.len() - succeeded;
        info!(succeeded, failed, "Batch complete");
        self.event_tx
            .send(Event::BatchCompleted { succeeded, failed })
            .ok();

        outcomes
    }

    /// Write every job's tags to the catalog, in job order, awaiting each
    /// insert. Runs to completion before any pipeline launches. An insert
    /// failure downgrades to a warning; the job downloads anyway, it just
    /// has no catalog row.
    async fn record_batch(&self, jobs: &[DownloadJob]) {
        for job in jobs {
            match self.db.insert_song(&job.item, &job.tags).await {
                Ok(_) => {
                    self.event_tx
                        .send(Event::CatalogRecorded {
                            url: job.item.clone(),
                        })
                        .ok();
                }
                Err(e) => {
                    warn!(item = %job.item, error = %e, "Failed to record song in catalog, downloading anyway");
                }
            }
        }
    }

    /// Spawn all pipelines, pacing successive launches by the configured
    /// delay, then await them jointly. Launch, not completion, is paced.
    async fn run_concurrent(&self, jobs: Vec<DownloadJob>) -> Vec<JobOutcome> {
        let delay = self.config.download.launch_delay();
        let mut items = Vec::with_capacity(jobs.len());
        let mut handles: Vec<JoinHandle<JobOutcome>> = Vec::with_capacity(jobs.len());

        for (index, job) in jobs.into_iter().enumerate() {
            if index > 0 {
                if let Some(delay) = delay {
                    debug!(?delay, "Pacing next pipeline launch");
                    tokio::time::sleep(delay).await;
                }
            }

            let scheduler = self.clone();
            items.push(job.item.clone());
            handles.push(tokio::spawn(async move {
                scheduler.run_pipeline(job).await
            }));
        }

        items
            .into_iter()
            .zip(join_all(handles).await)
            .map(|(item, joined)| joined_outcome(item, joined))
            .collect()
    }

    /// Launch each pipeline, optionally sleep the configured delay, then
    /// await its completion before launching the next. Strictly one pipeline
    /// is active at a time.
    async fn run_sequential(&self, jobs: Vec<DownloadJob>) -> Vec<JobOutcome> {
        let delay = self.config.download.launch_delay();
        let mut outcomes = Vec::with_capacity(jobs.len());

        for job in jobs {
            let scheduler = self.clone();
            let item = job.item.clone();
            let handle = tokio::spawn(async move { scheduler.run_pipeline(job).await });

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            outcomes.push(joined_outcome(item, handle.await));
        }

        outcomes
    }

    /// Run one job's pipeline to its terminal state, emitting lifecycle
    /// events on the way
    async fn run_pipeline(&self, job: DownloadJob) -> JobOutcome {
        self.event_tx
            .send(Event::JobStarted {
                url: job.item.clone(),
            })
            .ok();

        let result = self.execute(&job).await;

        match &result {
            Ok(path) => {
                info!(item = %job.item, path = %path.display(), "Download pipeline complete");
                self.event_tx
                    .send(Event::JobCompleted {
                        url: job.item.clone(),
                        path: path.clone(),
                    })
                    .ok();
            }
            Err(e) => {
                error!(item = %job.item, error = %e, "Download pipeline failed");
                self.event_tx
                    .send(Event::JobFailed {
                        url: job.item.clone(),
                        error: e.to_string(),
                    })
                    .ok();
            }
        }

        JobOutcome {
            item: job.item,
            result,
        }
    }

    /// Resolve, convert, and tag one item. The collision action is applied to
    /// the destination right before conversion, so the name reflects the
    /// directory state at the moment the output lands.
    async fn execute(&self, job: &DownloadJob) -> Result<PathBuf> {
        let raw_file = self.policy.run(job).await?;
        let destination =
            naming::resolve_collision(&job.destination, self.config.download.on_duplicate)?;
        let converted = self.post.convert(&raw_file, &destination).await?;
        self.post.tag(&converted, &job.tags).await?;
        Ok(converted)
    }
}

/// Collapse a finished pipeline task into its outcome. A panicked task
/// becomes a failed outcome for its item instead of tearing down the batch.
fn joined_outcome(
    item: ItemHandle,
    joined: std::result::Result<JobOutcome, JoinError>,
) -> JobOutcome {
    match joined {
        Ok(outcome) => outcome,
        Err(e) => JobOutcome {
            item,
            result: Err(Error::Other(format!("download task panicked: {}", e))),
        },
    }
}
