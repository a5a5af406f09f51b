use async_trait::async_trait;
use ferrous_recon_application::ports::{DataSource, EventBus, Subscription};
use ferrous_recon_domain::{BusEvent, DomainError, LogMessage, SourceTag, Topic};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

// ============================================================================
// Mock DataSource (scripted names per domain)
// ============================================================================

pub struct MockDataSource {
    name: &'static str,
    names: Mutex<HashMap<String, Vec<String>>>,
    failing: Mutex<Vec<String>>,
    delay: Mutex<Duration>,
    calls: AtomicUsize,
}

impl MockDataSource {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            names: Mutex::new(HashMap::new()),
            failing: Mutex::new(Vec::new()),
            delay: Mutex::new(Duration::ZERO),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_names(self, domain: &str, names: &[&str]) -> Self {
        self.names.lock().insert(
            domain.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
        self
    }

    pub fn failing_for(self, domain: &str) -> Self {
        self.failing.lock().push(domain.to_string());
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    fn name(&self) -> &str {
        self.name
    }

    fn tag(&self) -> SourceTag {
        SourceTag::Api
    }

    async fn discover(&self, domain: &str) -> Result<Vec<String>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().iter().any(|d| d == domain) {
            return Err(DomainError::DataSource {
                source_name: self.name.to_string(),
                reason: "HTTP 503".to_string(),
            });
        }
        Ok(self.names.lock().get(domain).cloned().unwrap_or_default())
    }
}

// ============================================================================
// Recording EventBus
// ============================================================================

#[derive(Default)]
pub struct RecordingBus {
    subscribers: Mutex<HashMap<Topic, Vec<mpsc::UnboundedSender<BusEvent>>>>,
    published: Mutex<Vec<BusEvent>>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_names(&self) -> Vec<String> {
        self.published
            .lock()
            .iter()
            .filter_map(|e| match e {
                BusEvent::NewName(s) => Some(s.name.to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn active_sources(&self) -> Vec<String> {
        self.published
            .lock()
            .iter()
            .filter_map(|e| match e {
                BusEvent::SetActive(source) => Some(source.to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn logs(&self) -> Vec<LogMessage> {
        self.published
            .lock()
            .iter()
            .filter_map(|e| match e {
                BusEvent::Log(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EventBus for RecordingBus {
    fn publish(&self, event: BusEvent) {
        if let Some(subs) = self.subscribers.lock().get_mut(&event.topic()) {
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
        self.published.lock().push(event);
    }

    fn subscribe(&self, topic: Topic) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().entry(topic).or_default().push(tx);
        Subscription::new(topic, rx)
    }
}
