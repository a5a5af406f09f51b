use ferrous_recon_domain::{BusEvent, TerminalSignal};
use futures::stream::{BoxStream, StreamExt};
use std::fmt;
use std::future::pending;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep_until, timeout, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Upper bound on waiting for in-flight tasks to report after the run stops.
const DRAIN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct QuiescenceSettings {
    pub poll_interval: Duration,
    /// Fully idle poll intervals, after the tick that clears the activity
    /// flag, that end the run.
    pub idle_intervals: u32,
    /// Absolute run deadline measured from the start of `run`.
    pub deadline: Option<Duration>,
}

impl Default for QuiescenceSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            idle_intervals: 1,
            deadline: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No activity for the configured number of poll intervals.
    Drained,
    TimedOut,
    /// Every answer producer is gone and the stream is empty.
    Exhausted,
    Cancelled,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Drained => "drained",
            StopReason::TimedOut => "timed_out",
            StopReason::Exhausted => "exhausted",
            StopReason::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    pub completed: u64,
    pub resolved: u64,
    pub reason: StopReason,
    pub elapsed: Duration,
}

/// Decides when the answer stream has gone quiet.
///
/// Any liveness event or terminal signal marks the current interval active. A
/// poll tick that finds the flag set clears it; a tick that finds it already
/// clear counts one idle interval. After `idle_intervals` idle intervals in a
/// row the run is drained. Ticks before the first terminal signal are a grace
/// period and never count.
pub struct QuiescenceDetector {
    settings: QuiescenceSettings,
}

impl QuiescenceDetector {
    pub fn new(settings: QuiescenceSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &QuiescenceSettings {
        &self.settings
    }

    /// Consumes the answer stream until a stop condition is met, handing every
    /// terminal signal to `sink`. The shared token is cancelled on every stop
    /// path, after which the stream is read until every sender is gone so that
    /// tasks stopped by the cancellation still deliver their signal.
    pub async fn run<F>(
        &self,
        mut answers: mpsc::Receiver<TerminalSignal>,
        mut liveness: BoxStream<'static, BusEvent>,
        cancel: &CancellationToken,
        mut sink: F,
    ) -> DrainReport
    where
        F: FnMut(TerminalSignal),
    {
        let started = Instant::now();
        let poll = self.settings.poll_interval;
        let idle_limit = self.settings.idle_intervals.max(1);

        let mut ticker = interval_at(started + poll, poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let deadline = self.settings.deadline.map(|d| started + d);
        let deadline_timer = async move {
            match deadline {
                Some(at) => sleep_until(at).await,
                None => pending::<()>().await,
            }
        };
        tokio::pin!(deadline_timer);

        let mut completed = 0u64;
        let mut resolved = 0u64;
        let mut first = true;
        let mut active = false;
        let mut quiet_ticks = 0u32;
        let mut liveness_open = true;

        let reason = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break StopReason::Cancelled,
                _ = &mut deadline_timer => break StopReason::TimedOut,
                signal = answers.recv() => match signal {
                    Some(signal) => {
                        first = false;
                        active = true;
                        completed += 1;
                        if signal.is_resolved() {
                            resolved += 1;
                        }
                        sink(signal);
                    }
                    None => break StopReason::Exhausted,
                },
                event = liveness.next(), if liveness_open => match event {
                    Some(_) => active = true,
                    None => liveness_open = false,
                },
                _ = ticker.tick() => {
                    if first {
                        continue;
                    }
                    if active {
                        active = false;
                        quiet_ticks = 0;
                    } else {
                        quiet_ticks += 1;
                    }
                    debug!(completed, quiet_ticks, "Quiescence poll");
                    if quiet_ticks >= idle_limit {
                        break StopReason::Drained;
                    }
                }
            }
        };

        let elapsed = started.elapsed();
        cancel.cancel();

        let drained = timeout(DRAIN_GRACE, async {
            while let Some(signal) = answers.recv().await {
                completed += 1;
                if signal.is_resolved() {
                    resolved += 1;
                }
                sink(signal);
            }
        })
        .await;
        if drained.is_err() {
            warn!(
                grace_ms = DRAIN_GRACE.as_millis() as u64,
                "Answer stream still open after cancellation"
            );
        }
        info!(
            completed,
            resolved,
            reason = %reason,
            elapsed_ms = elapsed.as_millis() as u64,
            "Enumeration stopped"
        );

        DrainReport {
            completed,
            resolved,
            reason,
            elapsed,
        }
    }
}
