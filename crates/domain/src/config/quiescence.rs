use serde::{Deserialize, Serialize};

/// Drain detection timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuiescenceConfig {
    /// Seconds between activity checks (default: 5)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Fully idle checks, after the check that clears activity, before the run
    /// is considered drained (default: 1)
    #[serde(default = "default_idle_intervals")]
    pub idle_intervals: u32,
}

impl Default for QuiescenceConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            idle_intervals: default_idle_intervals(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_idle_intervals() -> u32 {
    1
}
