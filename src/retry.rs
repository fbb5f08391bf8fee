//! Retry policy for download attempts with client identity rotation
//!
//! A failed attempt is reattempted immediately, up to the configured maximum.
//! Only an age-restriction failure rotates the client identity, since a
//! different client fingerprint can lift that restriction; region blocks and
//! plain unavailability are not helped by rotation, so those attempts keep
//! the current identity and simply try again.

use crate::config::Config;
use crate::error::{DownloadError, Error, FailureKind, Result, StreamError};
use crate::profile::ClientProfileRotator;
use crate::provider::ProviderSession;
use crate::resolver::StreamResolver;
use crate::types::DownloadJob;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Drives one job through repeated download attempts until a raw audio file
/// lands on disk or the attempt budget is exhausted
///
/// Cloneable; clones share the same rotator, so concurrently running jobs
/// observe (and advance) one identity sequence.
#[derive(Clone)]
pub struct DownloadAttemptPolicy {
    resolver: StreamResolver,
    rotator: ClientProfileRotator,
    config: Arc<Config>,
}

impl DownloadAttemptPolicy {
    /// Create a policy over the given resolver and shared rotator
    #[must_use]
    pub fn new(
        resolver: StreamResolver,
        rotator: ClientProfileRotator,
        config: Arc<Config>,
    ) -> Self {
        Self {
            resolver,
            rotator,
            config,
        }
    }

    /// Resolve a job to a raw audio file, retrying per the configured budget
    ///
    /// Attempts are immediate (no backoff sleep between them). The returned
    /// path always comes from the attempt that succeeded; a raw file left
    /// behind by an earlier failed attempt is never handed to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::RetriesExhausted`] carrying the attempt count
    /// and the last observed failure kind when every attempt failed.
    pub async fn run(&self, job: &DownloadJob) -> Result<PathBuf> {
        let download = &self.config.download;
        let max_retries = download.max_retries;
        let mut last_kind: Option<FailureKind> = None;

        for attempt in 1..=max_retries {
            let profile = self.rotator.current();
            let session = ProviderSession::from_config(profile, download);

            debug!(
                item = %job.item,
                attempt,
                max_retries,
                profile = %profile,
                "Starting download attempt"
            );

            match self.resolver.resolve(&session, &job.item).await {
                Ok(raw_file) => {
                    if attempt > 1 {
                        info!(item = %job.item, attempts = attempt, "Download succeeded after retry");
                    }
                    return Ok(raw_file);
                }
                Err(err) => {
                    last_kind = Some(err.kind());
                    match err {
                        StreamError::AgeRestricted => {
                            if download.use_oauth {
                                warn!(
                                    item = %job.item,
                                    attempt,
                                    profile = %profile,
                                    "Video is age restricted, rotating client profile"
                                );
                            } else {
                                warn!(
                                    item = %job.item,
                                    attempt,
                                    profile = %profile,
                                    "Video is age restricted, rotating client profile (enabling use_oauth may also help)"
                                );
                            }
                            let next = self.rotator.advance();
                            debug!(profile = %next, "Client profile rotated");
                        }
                        StreamError::RegionBlocked => {
                            warn!(
                                item = %job.item,
                                attempt,
                                "Video is blocked in this region, a proxy or VPN may get around the block"
                            );
                        }
                        StreamError::Unavailable(msg) => {
                            warn!(item = %job.item, attempt, error = %msg, "Video unavailable");
                        }
                        StreamError::ProviderError(msg) => {
                            warn!(item = %job.item, attempt, error = %msg, "Provider error");
                        }
                        StreamError::NetworkError(msg) => {
                            warn!(item = %job.item, attempt, error = %msg, "Network error");
                        }
                    }
                }
            }
        }

        // An attempt budget of zero exhausts without observing any failure
        let kind = last_kind.unwrap_or(FailureKind::Unavailable);
        error!(
            item = %job.item,
            attempts = max_retries,
            last_failure = %kind,
            "Download attempts exhausted"
        );
        Err(Error::Download(DownloadError::RetriesExhausted {
            attempts: max_retries,
            kind,
        }))
    }
}
