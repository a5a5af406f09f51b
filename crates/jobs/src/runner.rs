use crate::DiscoveryJob;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Starts the name-producing background jobs of a run.
///
/// Register jobs with the builder methods, then call `.start()` once.
///
/// # Example
///
/// ```rust,ignore
/// let producers_done = JobRunner::new()
///     .with_discovery(DiscoveryJob::new(sources, domains, bus))
///     .start();
/// ```
pub struct JobRunner {
    discovery: Option<DiscoveryJob>,
    shutdown: CancellationToken,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            discovery: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Registered jobs stop early when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn with_discovery(mut self, job: DiscoveryJob) -> Self {
        self.discovery = Some(job);
        self
    }

    /// Start all registered jobs.
    ///
    /// Returns a token that fires once every producer has finished, or `None`
    /// when nothing was registered.
    pub fn start(self) -> Option<CancellationToken> {
        info!("Starting background job runner");

        let done = self
            .discovery
            .filter(|job| job.source_count() > 0)
            .map(|job| Arc::new(job.with_cancellation(self.shutdown.child_token())).start());

        info!(producers = done.is_some() as usize, "All background jobs started");
        done
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
