use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Scheduling class of a lookup when resolver capacity is contended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryPriority {
    #[default]
    Low,
    High,
}

impl fmt::Display for QueryPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryPriority::Low => write!(f, "low"),
            QueryPriority::High => write!(f, "high"),
        }
    }
}

/// Lower-cases, trims whitespace and strips the trailing root dot.
///
/// Returns `None` when nothing is left.
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_ascii_lowercase())
}

/// A name admitted for resolution together with the root domain it falls under.
///
/// Uses `Arc<str>` so the pair can be handed to spawned tasks without copying.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateName {
    name: Arc<str>,
    domain: Arc<str>,
}

impl CandidateName {
    pub fn new(name: impl Into<Arc<str>>, domain: impl Into<Arc<str>>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::Admission("candidate name is empty".into()));
        }
        let domain = domain.into();
        if domain.is_empty() {
            return Err(DomainError::OutOfScope(name.to_string()));
        }
        Ok(Self { name, domain })
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn domain(&self) -> &Arc<str> {
        &self.domain
    }
}

impl fmt::Display for CandidateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
