use ferrous_recon_application::ports::{EventBus, Subscription};
use ferrous_recon_domain::{BusEvent, LogMessage, Topic};
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;

// ============================================================================
// Mock EventBus (records everything published)
// ============================================================================

#[derive(Default)]
pub struct MockEventBus {
    subscribers: Mutex<HashMap<Topic, Vec<mpsc::UnboundedSender<BusEvent>>>>,
    published: Mutex<Vec<BusEvent>>,
}

impl MockEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self, topic: Topic) -> Vec<BusEvent> {
        self.published
            .lock()
            .iter()
            .filter(|e| e.topic() == topic)
            .cloned()
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

impl EventBus for MockEventBus {
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
