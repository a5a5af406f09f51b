pub mod discovery;
pub mod runner;

pub use discovery::{DiscoveryJob, DiscoveryStats};
pub use runner::JobRunner;
