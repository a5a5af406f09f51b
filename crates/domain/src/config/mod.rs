//! Configuration module for Ferrous Recon
//!
//! This module contains all configuration structures organized by concern:
//! - `root`: Main configuration and CLI overrides
//! - `enumeration`: Scope, names, record types and admission limit
//! - `resolvers`: Upstream resolvers, retry and rate limits
//! - `health`: Upstream health tracking thresholds
//! - `quiescence`: Drain detection timing
//! - `sources`: Data source credentials and throttling
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod enumeration;
pub mod errors;
pub mod health;
pub mod logging;
pub mod quiescence;
pub mod resolvers;
pub mod root;
pub mod sources;

pub use enumeration::EnumerationConfig;
pub use errors::ConfigError;
pub use health::HealthCheckConfig;
pub use logging::LoggingConfig;
pub use quiescence::QuiescenceConfig;
pub use resolvers::ResolversConfig;
pub use root::{CliOverrides, Config};
pub use sources::{SourcesConfig, WhoisXmlConfig};
