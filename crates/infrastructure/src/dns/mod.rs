pub mod forwarding;
pub mod pool;
pub mod transport;
pub mod wildcard;

pub use pool::{PoolSettings, Upstream, UpstreamResolverPool};
pub use wildcard::{WildcardDetector, WildcardEntry, WildcardProbe};
