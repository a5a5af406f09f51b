use super::health::HealthSettings;
use super::scheduler::PriorityGate;
use super::upstream::Upstream;
use crate::dns::forwarding::{MessageBuilder, ResponseParser};
use crate::dns::wildcard::{WildcardDetector, WildcardProbe};
use async_trait::async_trait;
use ferrous_recon_application::ports::{EventBus, ResolverPool};
use ferrous_recon_domain::config::ResolversConfig;
use ferrous_recon_domain::{
    BusEvent, CandidateName, ConfigError, DomainError, QueryPriority, RecordType, Resolution,
    ResolutionAnswer, ResolutionError, ScopeSet, WildcardType,
};
use hickory_proto::op::ResponseCode;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub query_timeout: Duration,
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
    pub rate_limit_qps: u32,
    pub max_in_flight: usize,
    /// Publish a `ResolveCompleted` event for every upstream exchange.
    pub monitor_resolver_rate: bool,
    pub health: HealthSettings,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self::from(&ResolversConfig::default())
    }
}

impl From<&ResolversConfig> for PoolSettings {
    fn from(config: &ResolversConfig) -> Self {
        Self {
            query_timeout: Duration::from_millis(config.query_timeout_ms),
            max_attempts: config.max_attempts.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            backoff_cap: Duration::from_millis(config.backoff_cap_ms),
            rate_limit_qps: config.rate_limit_qps,
            max_in_flight: config.max_in_flight,
            monitor_resolver_rate: config.monitor_resolver_rate,
            health: HealthSettings::from(&config.health),
        }
    }
}

impl PoolSettings {
    /// Delay before retry number `attempt` (1-based): base doubled per attempt, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.backoff_base
            .saturating_mul(factor)
            .min(self.backoff_cap)
    }
}

/// Load-balanced resolver pool over a fixed set of upstream servers.
pub struct UpstreamResolverPool {
    upstreams: Vec<Upstream>,
    gate: PriorityGate,
    settings: PoolSettings,
    scope: ScopeSet,
    wildcards: WildcardDetector,
    bus: Option<Arc<dyn EventBus>>,
}

impl UpstreamResolverPool {
    pub fn new(
        upstreams: Vec<Upstream>,
        settings: PoolSettings,
        scope: ScopeSet,
        record_types: &[RecordType],
    ) -> Result<Self, DomainError> {
        if upstreams.is_empty() {
            return Err(DomainError::AllResolversUnreachable);
        }

        let gate = PriorityGate::new(settings.max_in_flight);
        info!(
            upstreams = upstreams.len(),
            max_in_flight = gate.capacity(),
            reserved_high = gate.reserved_capacity(),
            rate_limit_qps = settings.rate_limit_qps,
            domains = scope.len(),
            "Resolver pool ready"
        );

        Ok(Self {
            gate,
            wildcards: WildcardDetector::new(record_types),
            upstreams,
            settings,
            scope,
            bus: None,
        })
    }

    /// Pool over the configured resolver addresses using UDP with TCP fallback.
    pub fn from_config(
        config: &ResolversConfig,
        scope: ScopeSet,
        record_types: &[RecordType],
    ) -> Result<Self, ConfigError> {
        let settings = PoolSettings::from(config);
        let upstreams = config
            .upstream_addrs()?
            .into_iter()
            .map(|addr| Upstream::new(addr, settings.rate_limit_qps, settings.health.clone()))
            .collect();
        Self::new(upstreams, settings, scope, record_types)
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    pub fn with_event_bus(mut self, bus: Arc<dyn EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn upstreams(&self) -> &[Upstream] {
        &self.upstreams
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    /// Verifies at least one upstream answers a root `NS` query.
    ///
    /// Unresponsive upstreams are recorded as failures; an error means none replied.
    pub async fn check_reachability(&self, ctx: &CancellationToken) -> Result<usize, DomainError> {
        let query = MessageBuilder::build_root_ns_query()?;

        let checks = self.upstreams.iter().map(|upstream| {
            let query = &query;
            async move {
                let start = Instant::now();
                let outcome = tokio::select! {
                    _ = ctx.cancelled() => Err(DomainError::Cancelled),
                    r = upstream.exchange(query, self.settings.query_timeout) => r,
                };
                match outcome {
                    Ok(response) => {
                        upstream.health().record_success(upstream.name(), start.elapsed());
                        debug!(
                            server = %upstream.name(),
                            rcode = ResponseParser::rcode_to_status(response.rcode),
                            latency = ?upstream.health().average_latency(),
                            "Upstream reachable"
                        );
                        true
                    }
                    Err(e) => {
                        upstream.health().record_failure(upstream.name(), Instant::now());
                        warn!(server = %upstream.name(), error = %e, "Upstream unreachable");
                        false
                    }
                }
            }
        });

        let reachable = futures::future::join_all(checks)
            .await
            .into_iter()
            .filter(|ok| *ok)
            .count();
        if ctx.is_cancelled() {
            return Err(DomainError::Cancelled);
        }
        if reachable == 0 {
            return Err(DomainError::AllResolversUnreachable);
        }
        info!(
            reachable,
            total = self.upstreams.len(),
            "Upstream reachability checked"
        );
        Ok(reachable)
    }

    /// Weighted random pick among available upstreams, preferring ones not yet tried.
    fn select_upstream(&self, tried: &[usize]) -> Option<usize> {
        let now = Instant::now();
        let available: SmallVec<[(usize, f64); 8]> = self
            .upstreams
            .iter()
            .enumerate()
            .filter(|(_, u)| u.health().is_available(now))
            .map(|(i, u)| (i, u.health().weight()))
            .collect();
        if available.is_empty() {
            return None;
        }

        let untried: SmallVec<[(usize, f64); 8]> = available
            .iter()
            .copied()
            .filter(|(i, _)| !tried.contains(i))
            .collect();
        let candidates = if untried.is_empty() { &available } else { &untried };

        let total: f64 = candidates.iter().map(|(_, w)| w).sum();
        let mut point = fastrand::f64() * total;
        for &(index, weight) in candidates.iter() {
            if point < weight {
                return Some(index);
            }
            point -= weight;
        }
        candidates.last().map(|(i, _)| *i)
    }

    fn publish_completion(&self, upstream: &Upstream, rcode: &'static str) {
        if !self.settings.monitor_resolver_rate {
            return;
        }
        if let Some(bus) = &self.bus {
            bus.publish(BusEvent::ResolveCompleted {
                upstream: Arc::clone(upstream.name()),
                rcode,
                at: Instant::now(),
            });
        }
    }

    /// Picks an upstream for the next attempt. While every upstream is cooling
    /// down, waits for the earliest cooldown to end.
    async fn next_upstream(
        &self,
        ctx: &CancellationToken,
        name: &str,
        tried: &[usize],
    ) -> Result<usize, DomainError> {
        loop {
            if let Some(index) = self.select_upstream(tried) {
                return Ok(index);
            }
            let Some(until) = self
                .upstreams
                .iter()
                .filter_map(|u| u.health().cooldown_until())
                .min()
            else {
                return Err(DomainError::AllResolversUnreachable);
            };
            debug!(
                name = %name,
                wait_ms = until.saturating_duration_since(Instant::now()).as_millis() as u64,
                "Every upstream is cooling down"
            );
            tokio::select! {
                biased;
                _ = ctx.cancelled() => return Err(DomainError::Cancelled),
                _ = tokio::time::sleep_until(tokio::time::Instant::from_std(until)) => {}
            }
        }
    }

    async fn sleep_backoff(&self, ctx: &CancellationToken, attempt: u32) -> Result<(), DomainError> {
        let delay = self.settings.backoff(attempt);
        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(DomainError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

#[async_trait]
impl ResolverPool for UpstreamResolverPool {
    async fn resolve(
        &self,
        ctx: &CancellationToken,
        name: &str,
        record_type: RecordType,
        priority: QueryPriority,
    ) -> Result<Resolution, DomainError> {
        if ctx.is_cancelled() {
            return Err(DomainError::Cancelled);
        }
        let query = MessageBuilder::build_query(name, record_type)?;
        let _slot = self.gate.acquire(priority, ctx).await?;

        let start = Instant::now();
        let mut tried: SmallVec<[usize; 4]> = SmallVec::new();
        let mut last_error = None;

        for attempt in 0..self.settings.max_attempts {
            if attempt > 0 {
                self.sleep_backoff(ctx, attempt).await?;
            }
            let index = self.next_upstream(ctx, name, &tried).await?;
            tried.push(index);
            let upstream = &self.upstreams[index];

            upstream.rate().ready(ctx).await?;
            let sent = Instant::now();
            let outcome = tokio::select! {
                biased;
                _ = ctx.cancelled() => return Err(DomainError::Cancelled),
                r = upstream.exchange(&query, self.settings.query_timeout) => r,
            };

            match outcome {
                Ok(response) if response.is_server_error() => {
                    upstream.health().record_server_error();
                    self.publish_completion(upstream, ResponseParser::rcode_to_status(response.rcode));
                    debug!(
                        name = %name,
                        server = %upstream.name(),
                        rcode = ?response.rcode,
                        attempt = attempt + 1,
                        "Upstream refused to answer"
                    );
                    last_error = Some(DomainError::from(ResolutionError::ServFail {
                        server: upstream.name().to_string(),
                    }));
                }
                Ok(response) => {
                    upstream.health().record_success(upstream.name(), sent.elapsed());
                    self.publish_completion(upstream, ResponseParser::rcode_to_status(response.rcode));

                    let answers = if response.rcode == ResponseCode::NoError {
                        response.answers_of(record_type)
                    } else {
                        Vec::new()
                    };
                    return Ok(Resolution {
                        answers,
                        elapsed: start.elapsed(),
                        upstream: Some(Arc::clone(upstream.name())),
                    });
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    upstream.health().record_failure(upstream.name(), Instant::now());
                    self.publish_completion(upstream, "ERROR");
                    debug!(
                        name = %name,
                        server = %upstream.name(),
                        error = %e,
                        attempt = attempt + 1,
                        "Upstream query failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(DomainError::AllResolversUnreachable))
    }

    async fn get_wildcard_type(&self, ctx: &CancellationToken, domain: &str) -> WildcardType {
        self.wildcards.wildcard_type(ctx, domain, self).await
    }

    async fn matches_wildcard(
        &self,
        ctx: &CancellationToken,
        candidate: &CandidateName,
        answers: &[ResolutionAnswer],
    ) -> bool {
        self.wildcards.matches(ctx, candidate, answers, self).await
    }

    fn subdomain_to_domain(&self, name: &str) -> Option<Arc<str>> {
        self.scope.subdomain_to_domain(name)
    }
}

#[async_trait]
impl WildcardProbe for UpstreamResolverPool {
    async fn probe(
        &self,
        ctx: &CancellationToken,
        name: &str,
        record_type: RecordType,
    ) -> Result<Resolution, DomainError> {
        self.resolve(ctx, name, record_type, QueryPriority::High).await
    }
}
