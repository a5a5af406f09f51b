pub mod data_source;
pub mod event_bus;
pub mod resolver_pool;

pub use data_source::DataSource;
pub use event_bus::{merge_subscriptions, EventBus, Subscription};
pub use resolver_pool::ResolverPool;
