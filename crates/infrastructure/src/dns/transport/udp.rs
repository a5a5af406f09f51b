use super::{io_error, timeout_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use ferrous_recon_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP transport, one ephemeral socket per query.
pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn bind_addr(&self) -> SocketAddr {
        if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Bytes, DomainError> {
        let server = self.server_addr;
        let socket = UdpSocket::bind(self.bind_addr())
            .await
            .map_err(|e| io_error(server, "bind", e))?;
        socket
            .connect(server)
            .await
            .map_err(|e| io_error(server, "connect", e))?;

        let bytes_sent = socket
            .send(message_bytes)
            .await
            .map_err(|e| io_error(server, "send", e))?;
        debug!(server = %server, bytes_sent = bytes_sent, "UDP query sent");

        let query_id = message_id(message_bytes);
        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let bytes_received = socket
                .recv(&mut recv_buf)
                .await
                .map_err(|e| io_error(server, "recv", e))?;

            // Late answers to an earlier query on a recycled port are skipped.
            if bytes_received < 2 || message_id(&recv_buf[..bytes_received]) != query_id {
                warn!(server = %server, "Discarding UDP response with mismatched ID");
                continue;
            }

            recv_buf.truncate(bytes_received);
            debug!(server = %server, bytes_received = bytes_received, "UDP response received");
            return Ok(Bytes::from(recv_buf));
        }
    }
}

fn message_id(bytes: &[u8]) -> Option<u16> {
    (bytes.len() >= 2).then(|| u16::from_be_bytes([bytes[0], bytes[1]]))
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| timeout_error(self.server_addr))??;

        Ok(TransportResponse {
            bytes,
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
