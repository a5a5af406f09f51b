use super::errors::ConfigError;
use super::health::HealthCheckConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

const DEFAULT_DNS_PORT: u16 = 53;

/// Upstream resolver pool configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolversConfig {
    /// Upstream resolvers as "ip" or "ip:port"
    #[serde(default = "default_servers")]
    pub servers: Vec<String>,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Attempts per lookup, each against a different resolver when possible
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,

    /// Queries per second allowed against each resolver
    #[serde(default = "default_rate_limit_qps")]
    pub rate_limit_qps: u32,

    /// Pool-wide cap on outstanding upstream queries
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Publish a liveness event for every completed upstream query
    #[serde(default = "default_true")]
    pub monitor_resolver_rate: bool,

    #[serde(default)]
    pub health: HealthCheckConfig,
}

impl Default for ResolversConfig {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            query_timeout_ms: default_query_timeout_ms(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
            rate_limit_qps: default_rate_limit_qps(),
            max_in_flight: default_max_in_flight(),
            monitor_resolver_rate: true,
            health: HealthCheckConfig::default(),
        }
    }
}

impl ResolversConfig {
    /// Parses every configured server into a socket address.
    pub fn upstream_addrs(&self) -> Result<Vec<SocketAddr>, ConfigError> {
        let mut addrs = Vec::with_capacity(self.servers.len());
        for server in &self.servers {
            let addr = parse_resolver(server)?;
            if !addrs.contains(&addr) {
                addrs.push(addr);
            }
        }
        Ok(addrs)
    }
}

/// Accepts "1.1.1.1", "1.1.1.1:5353", "2606:4700::1111" and "[2606:4700::1111]:53".
pub fn parse_resolver(server: &str) -> Result<SocketAddr, ConfigError> {
    let s = server.trim();
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(addr);
    }
    s.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DEFAULT_DNS_PORT))
        .map_err(|_| ConfigError::InvalidResolver(server.to_string()))
}

fn default_servers() -> Vec<String> {
    vec![
        "8.8.8.8".to_string(),
        "1.1.1.1".to_string(),
        "9.9.9.9".to_string(),
        "208.67.222.222".to_string(),
    ]
}

fn default_query_timeout_ms() -> u64 {
    2000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    50
}

fn default_backoff_cap_ms() -> u64 {
    1000
}

fn default_rate_limit_qps() -> u32 {
    500
}

fn default_max_in_flight() -> usize {
    1024
}

fn default_true() -> bool {
    true
}
