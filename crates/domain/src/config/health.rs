use serde::{Deserialize, Serialize};

/// Health tracking configuration for upstream resolvers
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthCheckConfig {
    /// Number of recent outcomes kept per resolver (default: 50)
    #[serde(default = "default_window")]
    pub window: usize,

    /// Consecutive failures before a resolver is taken out of rotation (default: 5)
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Consecutive successes before a resolver is trusted again (default: 2)
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,

    /// Seconds an unhealthy resolver sits out before it is tried again (default: 5)
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            failure_threshold: default_failure_threshold(),
            success_threshold: default_success_threshold(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

fn default_window() -> usize {
    50
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_success_threshold() -> u32 {
    2
}

fn default_cooldown_secs() -> u64 {
    5
}
