use super::record_type_map::RecordTypeMapper;
use bytes::Bytes;
use ferrous_recon_domain::{DomainError, RecordType, ResolutionAnswer};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{RData, Record};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub id: u16,

    pub rcode: ResponseCode,

    pub truncated: bool,

    /// Answer section records of the types this crate understands, in wire order.
    pub answers: Vec<ResolutionAnswer>,

    /// Raw wire bytes of the upstream DNS response.
    pub raw_bytes: Bytes,
}

impl DnsResponse {
    pub fn is_nodata(&self) -> bool {
        self.rcode == ResponseCode::NoError && self.answers.is_empty()
    }

    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }

    /// The upstream failed to answer; another resolver may do better.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self.rcode,
            ResponseCode::ServFail | ResponseCode::Refused | ResponseCode::NotImp
        )
    }

    /// Answers of exactly `record_type`, dropping chained records such as the
    /// CNAME hops in front of an A answer.
    pub fn answers_of(&self, record_type: RecordType) -> Vec<ResolutionAnswer> {
        self.answers
            .iter()
            .filter(|a| a.record_type == record_type)
            .cloned()
            .collect()
    }
}

pub struct ResponseParser;

impl ResponseParser {
    /// Parses DNS response from owned bytes (zero-copy for raw_bytes).
    pub fn parse_bytes(response_bytes: Bytes) -> Result<DnsResponse, DomainError> {
        let message = Message::from_vec(&response_bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS response: {}", e))
        })?;

        let rcode = message.response_code();
        let truncated = message.truncated();

        let answers: Vec<ResolutionAnswer> = message
            .answers()
            .iter()
            .filter_map(Self::decode_answer)
            .collect();

        debug!(
            rcode = ?rcode,
            answers = answers.len(),
            truncated = truncated,
            "DNS response parsed"
        );

        Ok(DnsResponse {
            id: message.id(),
            rcode,
            truncated,
            answers,
            raw_bytes: response_bytes,
        })
    }

    pub fn parse(response_bytes: &[u8]) -> Result<DnsResponse, DomainError> {
        Self::parse_bytes(Bytes::copy_from_slice(response_bytes))
    }

    fn decode_answer(record: &Record) -> Option<ResolutionAnswer> {
        let record_type = RecordTypeMapper::from_hickory(record.record_type())?;
        let data = match record.data() {
            RData::A(a) => a.0.to_string(),
            RData::AAAA(aaaa) => aaaa.0.to_string(),
            RData::CNAME(name) => name.to_utf8(),
            RData::NS(name) => name.to_utf8(),
            RData::PTR(name) => name.to_utf8(),
            RData::MX(mx) => mx.exchange().to_utf8(),
            RData::SRV(srv) => srv.target().to_utf8(),
            RData::SOA(soa) => soa.mname().to_utf8(),
            RData::TXT(txt) => txt
                .txt_data()
                .iter()
                .map(|chunk| String::from_utf8_lossy(chunk))
                .collect::<String>(),
            other => other.to_string(),
        };
        Some(ResolutionAnswer::new(record_type, Self::trim_root(&data)))
    }

    fn trim_root(data: &str) -> Arc<str> {
        Arc::from(data.strip_suffix('.').unwrap_or(data))
    }

    pub fn rcode_to_status(rcode: ResponseCode) -> &'static str {
        match rcode {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::NXDomain => "NXDOMAIN",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::FormErr => "FORMERR",
            _ => "UNKNOWN",
        }
    }
}
