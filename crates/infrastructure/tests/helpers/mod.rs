#![allow(dead_code)]

pub mod dns_server_mock;
pub mod scripted_transport;

pub use dns_server_mock::MockDnsServer;
pub use scripted_transport::ScriptedTransport;

use std::net::Ipv4Addr;

/// How a fake upstream answers one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer(Vec<Ipv4Addr>),
    NxDomain,
    ServFail,
    Truncated,
    /// Never answers; the transport times out.
    Silent,
}

pub fn answer(ips: &[&str]) -> Reply {
    Reply::Answer(ips.iter().map(|ip| ip.parse().unwrap()).collect())
}

/// Query name carried by a wire-format DNS query, without the trailing dot.
pub fn query_name(query: &[u8]) -> String {
    let mut labels = Vec::new();
    let mut pos = 12;
    while pos < query.len() {
        let len = query[pos] as usize;
        if len == 0 {
            break;
        }
        labels.push(String::from_utf8_lossy(&query[pos + 1..pos + 1 + len]).to_string());
        pos += 1 + len;
    }
    labels.join(".")
}

/// Wire-format response to `query`: the question echoed back plus A records
/// pointing at it.
pub fn response_bytes(query: &[u8], reply: &Reply) -> Vec<u8> {
    let (rcode, truncated, ips): (u8, bool, &[Ipv4Addr]) = match reply {
        Reply::Answer(ips) => (0, false, ips),
        Reply::NxDomain => (3, false, &[]),
        Reply::ServFail => (2, false, &[]),
        Reply::Truncated => (0, true, &[]),
        Reply::Silent => return Vec::new(),
    };

    let mut response = Vec::with_capacity(512);
    response.extend_from_slice(&query[0..2]);
    // QR=1, RD=1, TC as requested
    response.push(0x81 | if truncated { 0x02 } else { 0x00 });
    // RA=1, RCODE
    response.push(0x80 | rcode);
    response.extend_from_slice(&query[4..6]);
    response.extend_from_slice(&(ips.len() as u16).to_be_bytes());
    response.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    response.extend_from_slice(&query[12..]);

    for ip in ips {
        response.extend_from_slice(&[
            0xc0, 0x0c, // pointer to the question name
            0x00, 0x01, // A
            0x00, 0x01, // IN
            0x00, 0x00, 0x00, 0x3c, // TTL 60
            0x00, 0x04,
        ]);
        response.extend_from_slice(&ip.octets());
    }
    response
}
