use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid record type: {0}")]
    InvalidRecordType(String),

    #[error("Invalid resolver address: {0}")]
    InvalidResolver(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}
