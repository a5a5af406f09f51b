use super::query_plan::QueryPlan;
use crate::ports::{EventBus, ResolverPool, Subscription};
use dashmap::DashSet;
use ferrous_recon_domain::{
    normalize_name, validate_hostname, Blacklist, BusEvent, CandidateName, DomainError, LogLevel, QueryPriority,
    RecordType, ResolutionResult, SuppressReason, TerminalSignal, Topic, WildcardType,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

const ORIGIN: &str = "orchestrator";

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Maximum number of names resolved at the same time.
    pub max_concurrent: usize,
    pub priority: QueryPriority,
    /// Capacity of the answer channel.
    pub answer_buffer: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_concurrent: 2500,
            priority: QueryPriority::Low,
            answer_buffer: 2500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    Admitted,
    /// Already admitted earlier in this run; not counted again.
    Duplicate,
}

#[derive(Default)]
struct AdmissionStats {
    admitted: AtomicU64,
    rejected: AtomicU64,
    duplicates: AtomicU64,
    completed: AtomicU64,
    resolved: AtomicU64,
    fatal: OnceLock<DomainError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdmissionSnapshot {
    pub admitted: u64,
    pub rejected: u64,
    pub duplicates: u64,
    pub completed: u64,
    pub resolved: u64,
}

/// Drives candidate names through the resolver pool under a fixed concurrency limit.
///
/// Each admitted name holds one ticket from a counting semaphore for the whole
/// life of its task, and produces exactly one [`TerminalSignal`] on the answer
/// channel. The ticket is an owned permit, so it is released on every exit path.
pub struct BoundedOrchestrator {
    pool: Arc<dyn ResolverPool>,
    bus: Arc<dyn EventBus>,
    plan: QueryPlan,
    blacklist: Blacklist,
    priority: QueryPriority,
    tickets: Arc<Semaphore>,
    max_tickets: usize,
    answers: mpsc::Sender<TerminalSignal>,
    seen: DashSet<Arc<str>>,
    stats: Arc<AdmissionStats>,
    cancel: CancellationToken,
}

impl BoundedOrchestrator {
    /// Creates the orchestrator and the receiving end of its answer channel.
    ///
    /// The channel closes once the orchestrator and every task it spawned are gone.
    pub fn new(
        pool: Arc<dyn ResolverPool>,
        bus: Arc<dyn EventBus>,
        plan: QueryPlan,
        blacklist: Blacklist,
        settings: OrchestratorSettings,
        cancel: CancellationToken,
    ) -> (Arc<Self>, mpsc::Receiver<TerminalSignal>) {
        let max_tickets = settings.max_concurrent.max(1);
        let (tx, rx) = mpsc::channel(settings.answer_buffer.max(1));

        info!(
            max_concurrent = max_tickets,
            priority = %settings.priority,
            record_types = ?plan.types(),
            blacklisted = blacklist.len(),
            "Orchestrator ready"
        );

        let orchestrator = Arc::new(Self {
            pool,
            bus,
            plan,
            blacklist,
            priority: settings.priority,
            tickets: Arc::new(Semaphore::new(max_tickets)),
            max_tickets,
            answers: tx,
            seen: DashSet::new(),
            stats: Arc::new(AdmissionStats::default()),
            cancel,
        });
        (orchestrator, rx)
    }

    /// Admits one candidate name, waiting for a free ticket if the limit is reached.
    ///
    /// Empty or malformed names are rejected before any ticket is taken.
    pub async fn submit(self: &Arc<Self>, raw: &str) -> Result<AdmissionOutcome, DomainError> {
        let name = match normalize_name(raw) {
            Some(name) => match validate_hostname(&name) {
                Ok(()) => name,
                Err(reason) => return Err(self.reject(raw, reason)),
            },
            None => return Err(self.reject(raw, "name is empty".to_string())),
        };
        let name: Arc<str> = Arc::from(name);

        if !self.seen.insert(Arc::clone(&name)) {
            self.stats.duplicates.fetch_add(1, Ordering::Relaxed);
            trace!(name = %name, "Duplicate candidate ignored");
            return Ok(AdmissionOutcome::Duplicate);
        }

        let ticket = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                self.seen.remove(&name);
                return Err(DomainError::Cancelled);
            }
            permit = Arc::clone(&self.tickets).acquire_owned() => {
                permit.map_err(|_| DomainError::Cancelled)?
            }
        };

        self.stats.admitted.fetch_add(1, Ordering::Relaxed);
        self.bus.publish(BusEvent::SetActive(Arc::from(ORIGIN)));

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let _ticket = ticket;
            let signal = this.resolve_candidate(name).await;

            this.stats.completed.fetch_add(1, Ordering::Relaxed);
            if signal.is_resolved() {
                this.stats.resolved.fetch_add(1, Ordering::Relaxed);
            }
            this.bus.publish(BusEvent::SetActive(Arc::from(ORIGIN)));

            // The receiver is gone once the run has stopped; nothing left to deliver to.
            let _ = this.answers.send(signal).await;
        });

        Ok(AdmissionOutcome::Admitted)
    }

    fn reject(&self, raw: &str, reason: String) -> DomainError {
        self.stats.rejected.fetch_add(1, Ordering::Relaxed);
        debug!(raw = %raw, reason = %reason, "Rejected malformed candidate name");
        DomainError::Admission(format!("{:?}: {}", raw, reason))
    }

    /// Admits every name in order until the run is cancelled.
    pub async fn admit_all<I, S>(self: &Arc<Self>, names: I) -> u64
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut admitted = 0;
        for name in names {
            match self.submit(name.as_ref()).await {
                Ok(AdmissionOutcome::Admitted) => admitted += 1,
                Ok(AdmissionOutcome::Duplicate) | Err(DomainError::Admission(_)) => {}
                Err(DomainError::Cancelled) => break,
                Err(e) => debug!(error = %e, "Admission failed"),
            }
        }
        admitted
    }

    /// Submits every name published on the `NewName` topic.
    ///
    /// Intake stops on cancellation, or once `producers_done` fires and the
    /// names already published have been submitted.
    pub fn spawn_bus_intake(self: &Arc<Self>, producers_done: CancellationToken) -> JoinHandle<()> {
        let subscription = self.bus.subscribe(Topic::NewName);
        self.spawn_intake(subscription, producers_done)
    }

    /// Like [`BoundedOrchestrator::spawn_bus_intake`] over a `NewName`
    /// subscription taken earlier, so names published in between are kept.
    pub fn spawn_intake(
        self: &Arc<Self>,
        subscription: Subscription,
        producers_done: CancellationToken,
    ) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run_intake(subscription, producers_done).await })
    }

    async fn run_intake(self: Arc<Self>, mut subscription: Subscription, producers_done: CancellationToken) {
        loop {
            let event = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                event = subscription.recv() => event,
                _ = producers_done.cancelled() => {
                    while let Some(event) = subscription.try_recv() {
                        if !self.intake_event(event).await {
                            break;
                        }
                    }
                    break;
                }
            };
            match event {
                Some(event) => {
                    if !self.intake_event(event).await {
                        break;
                    }
                }
                None => break,
            }
        }
        debug!("Bus intake stopped");
    }

    /// Returns false once the run has been cancelled.
    async fn intake_event(self: &Arc<Self>, event: BusEvent) -> bool {
        let BusEvent::NewName(submission) = event else {
            return true;
        };
        debug!(
            name = %submission.name,
            source = %submission.source,
            tag = %submission.tag,
            "Name received from data source"
        );
        !matches!(
            self.submit(&submission.name).await,
            Err(DomainError::Cancelled)
        )
    }

    async fn resolve_candidate(&self, name: Arc<str>) -> TerminalSignal {
        let suppressed = |name: Arc<str>, reason: SuppressReason| {
            trace!(name = %name, reason = %reason, "Candidate suppressed");
            TerminalSignal::Suppressed { name, reason }
        };

        if self.cancel.is_cancelled() {
            return suppressed(name, SuppressReason::Cancelled);
        }

        let Some(domain) = self.pool.subdomain_to_domain(&name) else {
            return suppressed(name, SuppressReason::OutOfScope);
        };
        let candidate = match CandidateName::new(Arc::clone(&name), domain) {
            Ok(c) => c,
            Err(_) => return suppressed(name, SuppressReason::OutOfScope),
        };

        if self.blacklist.is_blacklisted(&name) {
            return suppressed(name, SuppressReason::Blacklisted);
        }
        if self
            .pool
            .get_wildcard_type(&self.cancel, candidate.domain())
            .await
            == WildcardType::Dynamic
        {
            return suppressed(name, SuppressReason::DynamicWildcard);
        }

        let mut answers = Vec::new();
        for &record_type in self.plan.types() {
            if self.cancel.is_cancelled() {
                return suppressed(name, SuppressReason::Cancelled);
            }
            match self
                .pool
                .resolve(&self.cancel, &name, record_type, self.priority)
                .await
            {
                Ok(resolution) => answers.extend(resolution.answers),
                Err(DomainError::Cancelled) => {
                    return suppressed(name, SuppressReason::Cancelled);
                }
                Err(DomainError::AllResolversUnreachable) => {
                    self.abort(DomainError::AllResolversUnreachable);
                    return suppressed(name, SuppressReason::Cancelled);
                }
                Err(e) => {
                    debug!(name = %name, record_type = %record_type, error = %e, "Lookup failed");
                }
            }
            if self.plan.short_circuits(record_type, answers.len()) {
                trace!(name = %name, "CNAME found, skipping remaining types");
                break;
            }
        }

        if answers.is_empty() {
            return suppressed(name, SuppressReason::NoAnswers);
        }

        let mut result = ResolutionResult {
            name: Arc::clone(&name),
            domain: Arc::clone(candidate.domain()),
            answers,
            wildcard_rejected: false,
        };

        if self
            .pool
            .matches_wildcard(&self.cancel, &candidate, &result.answers)
            .await
        {
            result.wildcard_rejected = true;
            self.bus.publish(BusEvent::log(
                LogLevel::Debug,
                ORIGIN,
                format!("{} matches the wildcard of {}", result.name, result.domain),
            ));
            return suppressed(name, SuppressReason::WildcardMatch);
        }

        TerminalSignal::Resolved(result)
    }

    /// Records a run-ending error and cancels the run. Only the first error is kept.
    fn abort(&self, err: DomainError) {
        if self.stats.fatal.set(err.clone()).is_ok() {
            error!(error = %err, "Aborting enumeration");
            self.bus
                .publish(BusEvent::log(LogLevel::Error, ORIGIN, err.to_string()));
        }
        self.cancel.cancel();
    }

    /// Read-only view of the counters that outlives the orchestrator itself.
    ///
    /// The answer channel only closes once every `Arc` of the orchestrator is
    /// dropped, so callers waiting on it keep a monitor instead.
    pub fn monitor(&self) -> AdmissionMonitor {
        AdmissionMonitor {
            stats: Arc::clone(&self.stats),
            tickets: Arc::clone(&self.tickets),
            max_tickets: self.max_tickets,
        }
    }

    pub fn fatal_error(&self) -> Option<DomainError> {
        self.stats.fatal.get().cloned()
    }

    pub fn in_flight(&self) -> usize {
        self.monitor().in_flight()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_tickets
    }

    pub fn record_types(&self) -> &[RecordType] {
        self.plan.types()
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn snapshot(&self) -> AdmissionSnapshot {
        self.monitor().snapshot()
    }
}

#[derive(Clone)]
pub struct AdmissionMonitor {
    stats: Arc<AdmissionStats>,
    tickets: Arc<Semaphore>,
    max_tickets: usize,
}

impl AdmissionMonitor {
    pub fn snapshot(&self) -> AdmissionSnapshot {
        let stats = &self.stats;
        AdmissionSnapshot {
            admitted: stats.admitted.load(Ordering::Relaxed),
            rejected: stats.rejected.load(Ordering::Relaxed),
            duplicates: stats.duplicates.load(Ordering::Relaxed),
            completed: stats.completed.load(Ordering::Relaxed),
            resolved: stats.resolved.load(Ordering::Relaxed),
        }
    }

    /// Tickets currently held by in-flight resolutions.
    pub fn in_flight(&self) -> usize {
        self.max_tickets - self.tickets.available_permits()
    }

    pub fn fatal_error(&self) -> Option<DomainError> {
        self.stats.fatal.get().cloned()
    }
}
