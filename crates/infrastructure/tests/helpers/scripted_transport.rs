#![allow(dead_code)]
use super::{query_name, response_bytes, Reply};
use async_trait::async_trait;
use bytes::Bytes;
use ferrous_recon_domain::{DomainError, ResolutionError};
use ferrous_recon_infrastructure::dns::transport::{DnsTransport, TransportResponse};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

type Responder = dyn Fn(&str) -> Reply + Send + Sync;

/// In-process transport answering from a closure over the query name.
pub struct ScriptedTransport {
    label: &'static str,
    responder: Box<Responder>,
    delay: Mutex<Duration>,
    calls: AtomicUsize,
    names: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(responder: impl Fn(&str) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Self::labelled("udp", responder)
    }

    pub fn labelled(
        label: &'static str,
        responder: impl Fn(&str) -> Reply + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            label,
            responder: Box::new(responder),
            delay: Mutex::new(Duration::ZERO),
            calls: AtomicUsize::new(0),
            names: Mutex::new(Vec::new()),
        })
    }

    /// Always gives the same reply.
    pub fn fixed(reply: Reply) -> Arc<Self> {
        Self::new(move |_| reply.clone())
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn names(&self) -> Vec<String> {
        self.names.lock().clone()
    }
}

#[async_trait]
impl DnsTransport for ScriptedTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = query_name(message_bytes);
        self.names.lock().push(name.clone());

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let reply = (self.responder)(&name);
        if reply == Reply::Silent {
            tokio::time::sleep(timeout).await;
            return Err(ResolutionError::Timeout {
                server: format!("scripted-{}", self.label),
            }
            .into());
        }

        Ok(TransportResponse {
            bytes: Bytes::from(response_bytes(message_bytes, &reply)),
            protocol_used: self.label,
        })
    }

    fn protocol_name(&self) -> &'static str {
        self.label
    }
}
