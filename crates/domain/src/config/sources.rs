use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub whoisxml: WhoisXmlConfig,
}

/// Reverse-whois lookups through the WhoisXML API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhoisXmlConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    /// Minimum seconds between two API requests (default: 10)
    #[serde(default = "default_rate_limit_secs")]
    pub rate_limit_secs: u64,
}

impl Default for WhoisXmlConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            rate_limit_secs: default_rate_limit_secs(),
        }
    }
}

impl WhoisXmlConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

fn default_rate_limit_secs() -> u64 {
    10
}
