use super::orchestrator::{BoundedOrchestrator, OrchestratorSettings};
use super::query_plan::QueryPlan;
use super::quiescence::{QuiescenceDetector, QuiescenceSettings, StopReason};
use crate::ports::{merge_subscriptions, EventBus, ResolverPool};
use ferrous_recon_domain::{Blacklist, DomainError, TerminalSignal, Topic};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Totals reported when a run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub admitted: u64,
    pub completed: u64,
    pub resolved: u64,
    pub suppressed: u64,
    pub rejected: u64,
    pub duplicates: u64,
    pub reason: StopReason,
    pub elapsed: Duration,
}

/// One enumeration from the first admission to the final terminal signal.
pub struct EnumerationRun {
    pool: Arc<dyn ResolverPool>,
    bus: Arc<dyn EventBus>,
    plan: QueryPlan,
    blacklist: Blacklist,
    orchestrator: OrchestratorSettings,
    quiescence: QuiescenceSettings,
    monitor_resolver_rate: bool,
}

impl EnumerationRun {
    pub fn new(
        pool: Arc<dyn ResolverPool>,
        bus: Arc<dyn EventBus>,
        plan: QueryPlan,
        blacklist: Blacklist,
    ) -> Self {
        Self {
            pool,
            bus,
            plan,
            blacklist,
            orchestrator: OrchestratorSettings::default(),
            quiescence: QuiescenceSettings::default(),
            monitor_resolver_rate: true,
        }
    }

    pub fn with_orchestrator(mut self, settings: OrchestratorSettings) -> Self {
        self.orchestrator = settings;
        self
    }

    pub fn with_quiescence(mut self, settings: QuiescenceSettings) -> Self {
        self.quiescence = settings;
        self
    }

    /// When disabled, resolver completions no longer count as liveness.
    pub fn with_resolver_rate(mut self, enabled: bool) -> Self {
        self.monitor_resolver_rate = enabled;
        self
    }

    /// Resolves `names` plus every name published on the bus by the producers
    /// `start_producers` launches, until the token it returns fires. Producers
    /// are started only once the run is listening for their names.
    ///
    /// Returns the fatal error if the run was aborted because no upstream
    /// resolver could be reached.
    pub async fn execute<P, F>(
        &self,
        names: Vec<String>,
        start_producers: P,
        cancel: CancellationToken,
        sink: F,
    ) -> Result<RunSummary, DomainError>
    where
        P: FnOnce() -> Option<CancellationToken>,
        F: FnMut(TerminalSignal),
    {
        // Subscribe before the first admission so no pulse is missed.
        let mut liveness = vec![self.bus.subscribe(Topic::SetActive)];
        if self.monitor_resolver_rate {
            liveness.push(self.bus.subscribe(Topic::ResolveCompleted));
        }
        let liveness = merge_subscriptions(liveness);

        let (orchestrator, answers) = BoundedOrchestrator::new(
            Arc::clone(&self.pool),
            Arc::clone(&self.bus),
            self.plan.clone(),
            self.blacklist.clone(),
            self.orchestrator.clone(),
            cancel.clone(),
        );
        let monitor = orchestrator.monitor();

        let intake_subscription = self.bus.subscribe(Topic::NewName);
        let producers = start_producers();
        let intake = producers.map(|done| orchestrator.spawn_intake(intake_subscription, done));

        info!(
            static_names = names.len(),
            bus_intake = intake.is_some(),
            "Starting enumeration"
        );

        let admission = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.admit_all(names).await })
        };
        // The answer channel closes only after every holder of the orchestrator is gone.
        drop(orchestrator);

        let detector = QuiescenceDetector::new(self.quiescence.clone());
        let report = detector.run(answers, liveness, &cancel, sink).await;

        if let Err(e) = admission.await {
            warn!(error = %e, "Admission task failed");
        }
        if let Some(intake) = intake {
            if let Err(e) = intake.await {
                warn!(error = %e, "Bus intake task failed");
            }
        }

        if let Some(fatal) = monitor.fatal_error() {
            return Err(fatal);
        }

        let snapshot = monitor.snapshot();
        Ok(RunSummary {
            admitted: snapshot.admitted,
            completed: report.completed,
            resolved: report.resolved,
            suppressed: report.completed - report.resolved,
            rejected: snapshot.rejected,
            duplicates: snapshot.duplicates,
            reason: report.reason,
            elapsed: report.elapsed,
        })
    }
}
