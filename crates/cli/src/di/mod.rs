use ferrous_recon_application::ports::{DataSource, EventBus, ResolverPool};
use ferrous_recon_application::use_cases::{
    EnumerationRun, OrchestratorSettings, QueryPlan, QuiescenceSettings,
};
use ferrous_recon_domain::{Blacklist, Config, ScopeSet};
use ferrous_recon_infrastructure::bus::InMemoryEventBus;
use ferrous_recon_infrastructure::dns::UpstreamResolverPool;
use ferrous_recon_infrastructure::sources::WhoisXmlSource;
use ferrous_recon_jobs::{DiscoveryJob, JobRunner};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Everything one enumeration needs, wired from the loaded configuration.
pub struct Services {
    pub bus: Arc<InMemoryEventBus>,
    pub pool: Arc<UpstreamResolverPool>,
    pub sources: Vec<Arc<dyn DataSource>>,
}

impl Services {
    /// Builds the pool and checks that at least one upstream answers.
    pub async fn build(config: &Config, cancel: &CancellationToken) -> anyhow::Result<Self> {
        let bus = Arc::new(InMemoryEventBus::new());
        let scope = ScopeSet::new(&config.enumeration.domains);

        let pool = UpstreamResolverPool::from_config(
            &config.resolvers,
            scope,
            &config.enumeration.record_types,
        )?
        .with_event_bus(bus.clone() as Arc<dyn EventBus>);
        pool.check_reachability(cancel).await?;

        let mut sources: Vec<Arc<dyn DataSource>> = Vec::new();
        let whoisxml = &config.sources.whoisxml;
        if whoisxml.has_api_key() {
            sources.push(Arc::new(WhoisXmlSource::new(whoisxml)?));
        } else {
            info!(source = "WhoisXML", "API key data was not provided; source disabled");
        }

        Ok(Self {
            bus,
            pool: Arc::new(pool),
            sources,
        })
    }

    pub fn enumeration(&self, config: &Config) -> EnumerationRun {
        let e = &config.enumeration;
        let deadline = (e.timeout_minutes > 0).then(|| Duration::from_secs(e.timeout_minutes * 60));

        EnumerationRun::new(
            self.pool.clone() as Arc<dyn ResolverPool>,
            self.bus.clone() as Arc<dyn EventBus>,
            QueryPlan::new(&e.record_types),
            Blacklist::new(&e.blacklist),
        )
        .with_orchestrator(OrchestratorSettings {
            max_concurrent: e.max_dns_queries,
            priority: e.priority,
            answer_buffer: e.max_dns_queries,
        })
        .with_quiescence(QuiescenceSettings {
            poll_interval: Duration::from_secs(config.quiescence.poll_interval_secs),
            idle_intervals: config.quiescence.idle_intervals,
            deadline,
        })
        .with_resolver_rate(config.resolvers.monitor_resolver_rate)
    }

    /// Name producers for the run; nothing is started until `start` is called.
    pub fn jobs(&self, config: &Config, shutdown: CancellationToken) -> JobRunner {
        let domains = ScopeSet::new(&config.enumeration.domains)
            .domains()
            .to_vec();
        JobRunner::new()
            .with_cancellation(shutdown)
            .with_discovery(DiscoveryJob::new(
                self.sources.clone(),
                domains,
                self.bus.clone() as Arc<dyn EventBus>,
            ))
    }
}
