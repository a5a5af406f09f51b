use crate::dns_record::RecordType;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// One decoded DNS record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolutionAnswer {
    pub record_type: RecordType,
    /// Presentation-format record data without the trailing root dot.
    pub data: Arc<str>,
}

impl ResolutionAnswer {
    pub fn new(record_type: RecordType, data: impl Into<Arc<str>>) -> Self {
        Self {
            record_type,
            data: data.into(),
        }
    }
}

/// Response of the resolver pool for one (name, type) lookup.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub answers: Vec<ResolutionAnswer>,
    pub elapsed: Duration,
    pub upstream: Option<Arc<str>>,
}

impl Resolution {
    pub fn empty(elapsed: Duration) -> Self {
        Self {
            answers: Vec::new(),
            elapsed,
            upstream: None,
        }
    }
}

/// Outcome of resolving one candidate name across all queried types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    pub name: Arc<str>,
    pub domain: Arc<str>,
    pub answers: Vec<ResolutionAnswer>,
    pub wildcard_rejected: bool,
}

impl ResolutionResult {
    /// Distinct record data across all answers, used for wildcard set comparison.
    pub fn answer_data(&self) -> BTreeSet<Arc<str>> {
        self.answers.iter().map(|a| Arc::clone(&a.data)).collect()
    }

    /// Distinct record types present in the answers, in first-seen order.
    pub fn record_types(&self) -> Vec<RecordType> {
        let mut seen = Vec::with_capacity(self.answers.len());
        for answer in &self.answers {
            if !seen.contains(&answer.record_type) {
                seen.push(answer.record_type);
            }
        }
        seen
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuppressReason {
    OutOfScope,
    Blacklisted,
    DynamicWildcard,
    NoAnswers,
    WildcardMatch,
    Cancelled,
}

impl SuppressReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuppressReason::OutOfScope => "out_of_scope",
            SuppressReason::Blacklisted => "blacklisted",
            SuppressReason::DynamicWildcard => "dynamic_wildcard",
            SuppressReason::NoAnswers => "no_answers",
            SuppressReason::WildcardMatch => "wildcard_match",
            SuppressReason::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exactly one of these is delivered on the answer stream per admitted name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalSignal {
    Resolved(ResolutionResult),
    Suppressed { name: Arc<str>, reason: SuppressReason },
}

impl TerminalSignal {
    pub fn name(&self) -> &Arc<str> {
        match self {
            TerminalSignal::Resolved(r) => &r.name,
            TerminalSignal::Suppressed { name, .. } => name,
        }
    }

    pub fn result(&self) -> Option<&ResolutionResult> {
        match self {
            TerminalSignal::Resolved(r) => Some(r),
            TerminalSignal::Suppressed { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, TerminalSignal::Resolved(_))
    }
}
