use ferrous_recon_domain::config::HealthCheckConfig;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct HealthSettings {
    /// Number of recent outcomes kept for the success ratio.
    pub window: usize,
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub cooldown: Duration,
    /// Selection weight never drops below this, so a degraded upstream still gets probed.
    pub weight_floor: f64,
    /// Smoothing factor of the latency average; higher follows recent samples faster.
    pub latency_alpha: f64,
    /// Average latency at or below which an upstream keeps its full weight.
    pub latency_reference: Duration,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            window: 50,
            failure_threshold: 5,
            success_threshold: 2,
            cooldown: Duration::from_secs(5),
            weight_floor: 0.05,
            latency_alpha: 0.2,
            latency_reference: Duration::from_millis(100),
        }
    }
}

impl From<&HealthCheckConfig> for HealthSettings {
    fn from(config: &HealthCheckConfig) -> Self {
        Self {
            window: config.window.max(1),
            failure_threshold: config.failure_threshold.max(1),
            success_threshold: config.success_threshold.max(1),
            cooldown: Duration::from_secs(config.cooldown_secs),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    /// Taken out of rotation until the cooldown expires.
    Unhealthy { until: Instant },
    /// Cooldown expired; traffic is allowed again until enough successes restore it.
    Recovering,
}

#[derive(Debug)]
struct HealthState {
    outcomes: VecDeque<bool>,
    successes_in_window: usize,
    consecutive_failures: u32,
    consecutive_successes: u32,
    status: HealthStatus,
    /// Exponentially weighted average of successful exchange latency, in ms.
    latency_ewma_ms: Option<f64>,
}

/// Rolling health of one upstream resolver.
#[derive(Debug)]
pub struct ResolverHealth {
    settings: HealthSettings,
    state: Mutex<HealthState>,
}

impl ResolverHealth {
    pub fn new(settings: HealthSettings) -> Self {
        Self {
            state: Mutex::new(HealthState {
                outcomes: VecDeque::with_capacity(settings.window),
                successes_in_window: 0,
                consecutive_failures: 0,
                consecutive_successes: 0,
                status: HealthStatus::Healthy,
                latency_ewma_ms: None,
            }),
            settings,
        }
    }

    pub fn record_success(&self, server: &str, latency: Duration) {
        let mut state = self.state.lock();
        self.push_outcome(&mut state, true);
        let sample = latency.as_secs_f64() * 1000.0;
        state.latency_ewma_ms = Some(match state.latency_ewma_ms {
            Some(avg) => avg + self.settings.latency_alpha * (sample - avg),
            None => sample,
        });
        state.consecutive_failures = 0;
        state.consecutive_successes = state.consecutive_successes.saturating_add(1);

        if state.status == HealthStatus::Recovering
            && state.consecutive_successes >= self.settings.success_threshold
        {
            state.status = HealthStatus::Healthy;
            info!(server = %server, "Upstream resolver recovered");
        }
    }

    /// The upstream answered, but with SERVFAIL or REFUSED.
    ///
    /// The reply proves the upstream is reachable, so only the success ratio
    /// drops; the failure streak and cooldown are left alone.
    pub fn record_server_error(&self) {
        let mut state = self.state.lock();
        self.push_outcome(&mut state, false);
    }

    /// A transport failure or timeout; enough in a row take the upstream out of rotation.
    pub fn record_failure(&self, server: &str, now: Instant) {
        let mut state = self.state.lock();
        self.push_outcome(&mut state, false);
        state.consecutive_successes = 0;
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);

        let trip = match state.status {
            HealthStatus::Healthy => state.consecutive_failures >= self.settings.failure_threshold,
            HealthStatus::Recovering => true,
            HealthStatus::Unhealthy { .. } => false,
        };
        if trip {
            state.status = HealthStatus::Unhealthy {
                until: now + self.settings.cooldown,
            };
            warn!(
                server = %server,
                consecutive_failures = state.consecutive_failures,
                cooldown_secs = self.settings.cooldown.as_secs(),
                "Upstream resolver marked unhealthy"
            );
        }
    }

    /// Whether the upstream may be selected at `now`, moving it to
    /// `Recovering` once its cooldown has passed.
    pub fn is_available(&self, now: Instant) -> bool {
        let mut state = self.state.lock();
        match state.status {
            HealthStatus::Healthy | HealthStatus::Recovering => true,
            HealthStatus::Unhealthy { until } if now >= until => {
                state.status = HealthStatus::Recovering;
                state.consecutive_successes = 0;
                true
            }
            HealthStatus::Unhealthy { .. } => false,
        }
    }

    /// Success ratio over the window, scaled down for upstreams slower than
    /// the latency reference, floored.
    pub fn weight(&self) -> f64 {
        let state = self.state.lock();
        let ratio = if state.outcomes.is_empty() {
            1.0
        } else {
            state.successes_in_window as f64 / state.outcomes.len() as f64
        };
        let reference = self.settings.latency_reference.as_secs_f64() * 1000.0;
        let speed = match state.latency_ewma_ms {
            Some(avg) if avg > reference => reference / avg,
            _ => 1.0,
        };
        (ratio * speed).max(self.settings.weight_floor)
    }

    /// End of the cooldown, while the upstream is out of rotation.
    pub fn cooldown_until(&self) -> Option<Instant> {
        match self.state.lock().status {
            HealthStatus::Unhealthy { until } => Some(until),
            _ => None,
        }
    }

    pub fn status(&self) -> HealthStatus {
        self.state.lock().status
    }

    pub fn average_latency(&self) -> Option<Duration> {
        self.state
            .lock()
            .latency_ewma_ms
            .map(|ms| Duration::from_secs_f64(ms / 1000.0))
    }

    fn push_outcome(&self, state: &mut HealthState, success: bool) {
        if state.outcomes.len() == self.settings.window {
            if let Some(true) = state.outcomes.pop_front() {
                state.successes_in_window -= 1;
            }
        }
        state.outcomes.push_back(success);
        if success {
            state.successes_in_window += 1;
        }
    }
}
