pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;
use ferrous_recon_domain::{DomainError, ResolutionError};
use std::net::SocketAddr;
use std::time::Duration;

pub use tcp::TcpTransport;
pub use udp::UdpTransport;

/// Result of a raw DNS transport operation
#[derive(Debug)]
pub struct TransportResponse {
    /// Raw DNS response bytes (wire format)
    pub bytes: Bytes,
    /// Which protocol was used
    pub protocol_used: &'static str,
}

/// Trait for sending raw DNS messages to one upstream server
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

pub(crate) fn timeout_error(server: SocketAddr) -> DomainError {
    ResolutionError::Timeout {
        server: server.to_string(),
    }
    .into()
}

pub(crate) fn io_error(server: SocketAddr, action: &str, e: std::io::Error) -> DomainError {
    ResolutionError::Transport {
        server: server.to_string(),
        reason: format!("{}: {}", action, e),
    }
    .into()
}
