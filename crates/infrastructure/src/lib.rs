//! Ferrous Recon Infrastructure Layer
pub mod bus;
pub mod dns;
pub mod rate_limit;
pub mod sources;
