use super::enumeration::EnumerationConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::quiescence::QuiescenceConfig;
use super::resolvers::ResolversConfig;
use super::sources::SourcesConfig;
use crate::candidate::normalize_name;
use crate::dns_record::RecordType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub enumeration: EnumerationConfig,

    #[serde(default)]
    pub resolvers: ResolversConfig,

    #[serde(default)]
    pub quiescence: QuiescenceConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub domains: Vec<String>,
    pub names: Vec<String>,
    pub blacklist: Vec<String>,
    pub record_types: Vec<String>,
    pub resolvers: Vec<String>,
    pub max_dns_queries: Option<usize>,
    pub timeout_minutes: Option<u64>,
    pub disable_resolver_rate: bool,
    pub whoisxml_api_key: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from an optional TOML file, then apply CLI overrides.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides)?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) -> Result<(), ConfigError> {
        let enumeration = &mut self.enumeration;

        // Domains accumulate; names, blacklist, types and resolvers replace.
        for domain in overrides.domains {
            if !enumeration.domains.contains(&domain) {
                enumeration.domains.push(domain);
            }
        }
        if !overrides.names.is_empty() {
            enumeration.names = overrides.names;
        }
        if !overrides.blacklist.is_empty() {
            enumeration.blacklist = overrides.blacklist;
        }
        if !overrides.record_types.is_empty() {
            enumeration.record_types = overrides
                .record_types
                .iter()
                .map(|t| {
                    t.parse::<RecordType>()
                        .map_err(|_| ConfigError::InvalidRecordType(t.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
        }
        if let Some(max) = overrides.max_dns_queries.filter(|m| *m > 0) {
            enumeration.max_dns_queries = max;
        }
        if let Some(timeout) = overrides.timeout_minutes.filter(|t| *t > 0) {
            enumeration.timeout_minutes = timeout;
        }

        if !overrides.resolvers.is_empty() {
            self.resolvers.servers = overrides.resolvers;
        }
        if overrides.disable_resolver_rate {
            self.resolvers.monitor_resolver_rate = false;
        }
        if let Some(key) = overrides.whoisxml_api_key {
            self.sources.whoisxml.api_key = Some(key);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let e = &self.enumeration;
        if !e.domains.iter().any(|d| normalize_name(d).is_some()) {
            return Err(ConfigError::Validation(
                "at least one root domain must be provided".into(),
            ));
        }
        if e.max_dns_queries == 0 {
            return Err(ConfigError::Validation(
                "max_dns_queries must be greater than zero".into(),
            ));
        }

        let r = &self.resolvers;
        if r.upstream_addrs()?.is_empty() {
            return Err(ConfigError::Validation(
                "at least one resolver must be configured".into(),
            ));
        }
        if r.max_attempts == 0 {
            return Err(ConfigError::Validation("max_attempts must be at least 1".into()));
        }
        if r.rate_limit_qps == 0 {
            return Err(ConfigError::Validation(
                "rate_limit_qps must be greater than zero".into(),
            ));
        }
        if r.max_in_flight < 2 {
            return Err(ConfigError::Validation("max_in_flight must be at least 2".into()));
        }
        if r.health.window == 0 || r.health.failure_threshold == 0 {
            return Err(ConfigError::Validation(
                "health window and failure_threshold must be greater than zero".into(),
            ));
        }

        let q = &self.quiescence;
        if q.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll_interval_secs must be greater than zero".into(),
            ));
        }
        if q.idle_intervals == 0 {
            return Err(ConfigError::Validation(
                "idle_intervals must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
