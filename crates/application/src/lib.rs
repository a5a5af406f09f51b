//! Ferrous Recon Application Layer
//!
//! Ports describe what the enumeration core needs from the outside world
//! (a resolver pool, an event bus, data sources); use cases drive a run.
pub mod ports;
pub mod use_cases;
