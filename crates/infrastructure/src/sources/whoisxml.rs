use crate::rate_limit::RateGate;
use async_trait::async_trait;
use ferrous_recon_application::ports::DataSource;
use ferrous_recon_domain::config::WhoisXmlConfig;
use ferrous_recon_domain::{DomainError, SourceTag};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const WHOISXML_ENDPOINT: &str = "https://reverse-whois-api.whoisxmlapi.com/api/v2";
const SOURCE_NAME: &str = "WhoisXML";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ReverseWhoisRequest<'a> {
    #[serde(rename = "searchType")]
    search_type: &'a str,
    mode: &'a str,
    #[serde(rename = "basicSearchTerms")]
    basic_search_terms: BasicSearchTerms<'a>,
}

#[derive(Debug, Serialize)]
struct BasicSearchTerms<'a> {
    include: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ReverseWhoisResponse {
    #[serde(rename = "domainsCount", default)]
    domains_count: u64,
    #[serde(rename = "domainsList", default)]
    domains_list: Vec<String>,
}

/// Reverse-whois lookups against the WhoisXML API.
pub struct WhoisXmlSource {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    rate: RateGate,
}

impl WhoisXmlSource {
    pub fn new(config: &WhoisXmlConfig) -> Result<Self, DomainError> {
        Self::with_endpoint(config, WHOISXML_ENDPOINT)
    }

    pub fn with_endpoint(config: &WhoisXmlConfig, endpoint: &str) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .user_agent("Ferrous-Recon/0.3 (reverse-whois)")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Self::error(e.to_string()))?;

        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
            rate: RateGate::every(Duration::from_secs(config.rate_limit_secs)),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn error(reason: impl Into<String>) -> DomainError {
        DomainError::DataSource {
            source_name: SOURCE_NAME.to_string(),
            reason: reason.into(),
        }
    }

    async fn query(&self, api_key: &str, domain: &str) -> Result<Vec<String>, DomainError> {
        let request = ReverseWhoisRequest {
            search_type: "historic",
            mode: "purchase",
            basic_search_terms: BasicSearchTerms {
                include: vec![domain],
            },
        };
        let body = serde_json::to_vec(&request).map_err(|e| Self::error(e.to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Authentication-Token", api_key)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| Self::error(format!("{}: {}", self.endpoint, e)))?;

        if !response.status().is_success() {
            return Err(Self::error(format!(
                "{}: HTTP {}",
                self.endpoint,
                response.status().as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::error(format!("{}: {}", self.endpoint, e)))?;
        parse_response(&bytes)
    }
}

/// Names listed in a reverse-whois reply; empty when the count is zero.
fn parse_response(bytes: &[u8]) -> Result<Vec<String>, DomainError> {
    let parsed: ReverseWhoisResponse = serde_json::from_slice(bytes)
        .map_err(|e| WhoisXmlSource::error(format!("failed to decode response: {}", e)))?;
    if parsed.domains_count == 0 {
        return Ok(Vec::new());
    }
    Ok(parsed.domains_list)
}

#[async_trait]
impl DataSource for WhoisXmlSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn tag(&self) -> SourceTag {
        SourceTag::Api
    }

    async fn discover(&self, domain: &str) -> Result<Vec<String>, DomainError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(Self::error("API key data was not provided"));
        };

        self.rate.wait().await;
        debug!(domain = %domain, "Querying reverse whois");

        let names = self.query(api_key, domain).await?;
        info!(domain = %domain, found = names.len(), "Reverse whois completed");
        Ok(names)
    }
}
