use ferrous_recon_application::ports::{DataSource, EventBus};
use ferrous_recon_domain::{BusEvent, DomainError, LogLevel, NameSubmission, ScopeSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryStats {
    pub queried: usize,
    pub published: usize,
    pub failed: usize,
    /// Related registered domains outside every configured root.
    pub new_roots: usize,
}

/// Asks every data source about every root domain and feeds the names onto the bus.
pub struct DiscoveryJob {
    sources: Vec<Arc<dyn DataSource>>,
    domains: Vec<Arc<str>>,
    scope: ScopeSet,
    bus: Arc<dyn EventBus>,
    shutdown: CancellationToken,
}

impl DiscoveryJob {
    pub fn new(
        sources: Vec<Arc<dyn DataSource>>,
        domains: Vec<Arc<str>>,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            sources,
            scope: ScopeSet::new(&domains),
            domains,
            bus,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Runs the job in the background. The returned token fires once every
    /// source has been queried, or the job was shut down.
    pub fn start(self: Arc<Self>) -> CancellationToken {
        info!(
            sources = self.sources.len(),
            domains = self.domains.len(),
            "Starting discovery job"
        );

        let done = CancellationToken::new();
        let finished = done.clone();
        tokio::spawn(async move {
            let stats = self.run().await;
            info!(
                queried = stats.queried,
                published = stats.published,
                failed = stats.failed,
                new_roots = stats.new_roots,
                "DiscoveryJob: finished"
            );
            finished.cancel();
        });
        done
    }

    pub async fn run(&self) -> DiscoveryStats {
        let mut stats = DiscoveryStats::default();

        for domain in &self.domains {
            for source in &self.sources {
                if self.shutdown.is_cancelled() {
                    info!("DiscoveryJob: shutting down");
                    return stats;
                }
                self.bus.publish(BusEvent::SetActive(Arc::from(source.name())));

                let outcome = tokio::select! {
                    biased;
                    _ = self.shutdown.cancelled() => {
                        info!("DiscoveryJob: shutting down");
                        return stats;
                    }
                    r = source.discover(domain) => r,
                };
                stats.queried += 1;

                match outcome {
                    Ok(names) => self.publish_names(source.as_ref(), domain, &names, &mut stats),
                    Err(e) => {
                        stats.failed += 1;
                        self.report_failure(source.as_ref(), domain, &e);
                    }
                }
            }
        }
        stats
    }

    /// Names under a configured root become candidates. Anything else, such as
    /// a sibling registration found by reverse whois, is reported as a new root
    /// domain instead, since it could never be resolved in this run.
    fn publish_names(
        &self,
        source: &dyn DataSource,
        domain: &str,
        names: &[String],
        stats: &mut DiscoveryStats,
    ) {
        let before = stats.published;
        for name in names {
            let Some(submission) = NameSubmission::new(name, domain, source.tag(), source.name())
            else {
                debug!(source = %source.name(), raw = %name, "Skipping empty name");
                continue;
            };
            if self.scope.subdomain_to_domain(&submission.name).is_none() {
                stats.new_roots += 1;
                info!(
                    source = %source.name(),
                    related_to = %domain,
                    root = %submission.name,
                    "New root domain discovered"
                );
                self.bus.publish(BusEvent::log(
                    LogLevel::Info,
                    source.name(),
                    format!("new root domain {} related to {}", submission.name, domain),
                ));
                continue;
            }
            self.bus.publish(BusEvent::NewName(submission));
            stats.published += 1;
        }
        debug!(
            source = %source.name(),
            domain = %domain,
            published = stats.published - before,
            "Names published"
        );
    }

    fn report_failure(&self, source: &dyn DataSource, domain: &str, error: &DomainError) {
        warn!(source = %source.name(), domain = %domain, error = %error, "Data source query failed");
        self.bus.publish(BusEvent::log(
            LogLevel::Warn,
            source.name(),
            format!("{}: {}", domain, error),
        ));
    }
}
