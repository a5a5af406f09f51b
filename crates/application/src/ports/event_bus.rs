use ferrous_recon_domain::{BusEvent, Topic};
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc;

/// Publish/subscribe channel scoped to a single run.
///
/// `publish` never blocks: events are delivered in publish order to every
/// subscription that existed when they were published.
pub trait EventBus: Send + Sync {
    fn publish(&self, event: BusEvent);

    fn subscribe(&self, topic: Topic) -> Subscription;
}

/// Receiving end of a topic subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    topic: Topic,
    rx: mpsc::UnboundedReceiver<BusEvent>,
}

impl Subscription {
    pub fn new(topic: Topic, rx: mpsc::UnboundedReceiver<BusEvent>) -> Self {
        Self { topic, rx }
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Next event, or `None` once the bus has been torn down.
    pub async fn recv(&mut self) -> Option<BusEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<BusEvent> {
        self.rx.try_recv().ok()
    }

    pub fn into_stream(self) -> BoxStream<'static, BusEvent> {
        stream::unfold(self, |mut sub| async move {
            sub.recv().await.map(|event| (event, sub))
        })
        .boxed()
    }
}

/// Merges several subscriptions into a single stream.
pub fn merge_subscriptions(subscriptions: Vec<Subscription>) -> BoxStream<'static, BusEvent> {
    stream::select_all(subscriptions.into_iter().map(Subscription::into_stream)).boxed()
}
