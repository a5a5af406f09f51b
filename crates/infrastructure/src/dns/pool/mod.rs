//! Upstream resolver pool
//!
//! - `health`: per-upstream rolling health and cooldown
//! - `scheduler`: in-flight cap with reserved high-priority slots
//! - `upstream`: one resolver with its transports and throttle
//! - `resolver`: `UpstreamResolverPool`, the `ResolverPool` implementation

pub mod health;
pub mod resolver;
pub mod scheduler;
pub mod upstream;

pub use health::{HealthSettings, HealthStatus, ResolverHealth};
pub use resolver::{PoolSettings, UpstreamResolverPool};
pub use scheduler::{GatePermit, PriorityGate};
pub use upstream::Upstream;
