use crate::candidate::QueryPriority;
use crate::dns_record::RecordType;
use serde::{Deserialize, Serialize};

/// What to enumerate and how hard to push
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnumerationConfig {
    /// Root domains under study
    #[serde(default)]
    pub domains: Vec<String>,

    /// Already known subdomain names to resolve
    #[serde(default)]
    pub names: Vec<String>,

    /// Names that will not be investigated (subdomains included)
    #[serde(default)]
    pub blacklist: Vec<String>,

    /// Record types queried for every name, in order
    #[serde(default = "default_record_types")]
    pub record_types: Vec<RecordType>,

    /// Maximum number of names resolved concurrently (default: 2500)
    #[serde(default = "default_max_dns_queries")]
    pub max_dns_queries: usize,

    /// Minutes before the run is forcibly stopped; 0 disables the deadline
    #[serde(default)]
    pub timeout_minutes: u64,

    /// Scheduling class used for name lookups
    #[serde(default)]
    pub priority: QueryPriority,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            domains: vec![],
            names: vec![],
            blacklist: vec![],
            record_types: default_record_types(),
            max_dns_queries: default_max_dns_queries(),
            timeout_minutes: 0,
            priority: QueryPriority::Low,
        }
    }
}

fn default_record_types() -> Vec<RecordType> {
    vec![RecordType::A]
}

fn default_max_dns_queries() -> usize {
    2500
}
