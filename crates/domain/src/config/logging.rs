use serde::{Deserialize, Serialize};

/// Diagnostics written to stderr; stdout is reserved for resolved names.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive such as `info` or `ferrous_recon=debug`.
    /// `RUST_LOG` takes precedence when set; `-v` raises it to `debug`.
    #[serde(default = "default_filter")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_filter(),
        }
    }
}

fn default_filter() -> String {
    String::from("info")
}
