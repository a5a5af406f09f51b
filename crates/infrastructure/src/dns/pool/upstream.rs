use super::health::{HealthSettings, ResolverHealth};
use crate::dns::forwarding::{DnsResponse, ResponseParser};
use crate::dns::transport::{DnsTransport, TcpTransport, UdpTransport};
use crate::rate_limit::RateGate;
use ferrous_recon_domain::DomainError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// One upstream resolver with its transports, throttle and health record.
pub struct Upstream {
    name: Arc<str>,
    udp: Arc<dyn DnsTransport>,
    tcp: Arc<dyn DnsTransport>,
    rate: RateGate,
    health: ResolverHealth,
}

impl Upstream {
    pub fn new(addr: SocketAddr, rate_limit_qps: u32, health: HealthSettings) -> Self {
        Self::with_transports(
            Arc::from(addr.to_string()),
            Arc::new(UdpTransport::new(addr)),
            Arc::new(TcpTransport::new(addr)),
            rate_limit_qps,
            health,
        )
    }

    pub fn with_transports(
        name: Arc<str>,
        udp: Arc<dyn DnsTransport>,
        tcp: Arc<dyn DnsTransport>,
        rate_limit_qps: u32,
        health: HealthSettings,
    ) -> Self {
        Self {
            name,
            udp,
            tcp,
            rate: RateGate::per_second(rate_limit_qps),
            health: ResolverHealth::new(health),
        }
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn health(&self) -> &ResolverHealth {
        &self.health
    }

    pub fn rate(&self) -> &RateGate {
        &self.rate
    }

    /// Sends `query_bytes` over UDP, retrying over TCP when the answer is truncated.
    pub async fn exchange(
        &self,
        query_bytes: &[u8],
        timeout: Duration,
    ) -> Result<DnsResponse, DomainError> {
        let start = Instant::now();
        let response = self.udp.send(query_bytes, timeout).await?;
        let parsed = ResponseParser::parse_bytes(response.bytes)?;

        if !parsed.truncated {
            return Ok(parsed);
        }

        debug!(server = %self.name, "Response truncated (TC bit), retrying via TCP");
        let remaining = timeout
            .checked_sub(start.elapsed())
            .unwrap_or(Duration::from_millis(500));
        let tcp_response = self.tcp.send(query_bytes, remaining).await?;
        ResponseParser::parse_bytes(tcp_response.bytes)
    }
}
