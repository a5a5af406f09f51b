//! Ferrous Recon Domain Layer
pub mod candidate;
pub mod config;
pub mod dns_record;
pub mod errors;
pub mod events;
pub mod resolution;
pub mod scope;
pub mod validators;
pub mod wildcard;

pub use candidate::{normalize_name, CandidateName, QueryPriority};
pub use config::{CliOverrides, Config, ConfigError};
pub use dns_record::RecordType;
pub use errors::{DomainError, ResolutionError};
pub use events::{BusEvent, LogLevel, LogMessage, NameSubmission, SourceTag, Topic};
pub use resolution::{
    Resolution, ResolutionAnswer, ResolutionResult, SuppressReason, TerminalSignal,
};
pub use scope::{Blacklist, ScopeSet};
pub use validators::validate_hostname;
pub use wildcard::WildcardType;
