use dashmap::DashMap;
use ferrous_recon_application::ports::{EventBus, Subscription};
use ferrous_recon_domain::{BusEvent, Topic};
use tokio::sync::mpsc;
use tracing::trace;

/// Process-local event bus scoped to one run.
///
/// Each subscription owns an unbounded channel, so `publish` never waits on a
/// slow consumer. Dropped subscriptions are pruned on the next publish to
/// their topic.
#[derive(Default)]
pub struct InMemoryEventBus {
    subscribers: DashMap<Topic, Vec<mpsc::UnboundedSender<BusEvent>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers.get(&topic).map_or(0, |subs| subs.len())
    }

    /// Drops every subscriber; their streams end once drained.
    pub fn close(&self) {
        self.subscribers.clear();
    }
}

impl EventBus for InMemoryEventBus {
    fn publish(&self, event: BusEvent) {
        let topic = event.topic();
        let Some(mut subs) = self.subscribers.get_mut(&topic) else {
            return;
        };
        subs.retain(|tx| tx.send(event.clone()).is_ok());
        trace!(topic = ?topic, subscribers = subs.len(), "Event published");
    }

    fn subscribe(&self, topic: Topic) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.entry(topic).or_default().push(tx);
        Subscription::new(topic, rx)
    }
}
