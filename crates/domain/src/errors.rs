use thiserror::Error;

/// Failure of a single upstream lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Query to {server} timed out")]
    Timeout { server: String },

    #[error("Server failure from {server}")]
    ServFail { server: String },

    #[error("Transport error contacting {server}: {reason}")]
    Transport { server: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("All upstream resolvers are unreachable")]
    AllResolversUnreachable,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Name is outside the configured domains: {0}")]
    OutOfScope(String),

    #[error("Admission rejected: {0}")]
    Admission(String),

    #[error("Data source {source_name} failed: {reason}")]
    DataSource { source_name: String, reason: String },
}

impl DomainError {
    /// Whether another upstream might still answer the same query.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::Resolution(_) | DomainError::IoError(_) | DomainError::InvalidDnsResponse(_)
        )
    }
}
