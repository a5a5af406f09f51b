pub mod config;
pub mod inputs;
pub mod logging;

pub use config::{load_config, log_config};
pub use inputs::read_list;
pub use logging::{init_logging, spawn_log_forwarder};
