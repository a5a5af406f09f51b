use crate::candidate::normalize_name;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Bus topics the enumeration core consumes or produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    NewName,
    SetActive,
    ResolveCompleted,
    Log,
}

/// How a data source obtained its names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTag {
    Api,
    Scrape,
    Dns,
    External,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Api => "api",
            SourceTag::Scrape => "scrape",
            SourceTag::Dns => "dns",
            SourceTag::External => "ext",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate name published by a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSubmission {
    pub name: Arc<str>,
    pub domain: Arc<str>,
    pub tag: SourceTag,
    pub source: Arc<str>,
}

impl NameSubmission {
    pub fn new(name: &str, domain: &str, tag: SourceTag, source: impl Into<Arc<str>>) -> Option<Self> {
        let name = normalize_name(name)?;
        Some(Self {
            name: Arc::from(name),
            domain: Arc::from(domain),
            tag,
            source: source.into(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub level: LogLevel,
    pub origin: Arc<str>,
    pub message: String,
}

impl LogMessage {
    pub fn new(level: LogLevel, origin: impl Into<Arc<str>>, message: impl Into<String>) -> Self {
        Self {
            level,
            origin: origin.into(),
            message: message.into(),
        }
    }
}

/// Payloads carried by the run's event bus.
#[derive(Debug, Clone)]
pub enum BusEvent {
    NewName(NameSubmission),
    SetActive(Arc<str>),
    ResolveCompleted {
        upstream: Arc<str>,
        rcode: &'static str,
        at: Instant,
    },
    Log(LogMessage),
}

impl BusEvent {
    pub fn topic(&self) -> Topic {
        match self {
            BusEvent::NewName(_) => Topic::NewName,
            BusEvent::SetActive(_) => Topic::SetActive,
            BusEvent::ResolveCompleted { .. } => Topic::ResolveCompleted,
            BusEvent::Log(_) => Topic::Log,
        }
    }

    pub fn log(level: LogLevel, origin: impl Into<Arc<str>>, message: impl Into<String>) -> Self {
        BusEvent::Log(LogMessage::new(level, origin, message))
    }
}
