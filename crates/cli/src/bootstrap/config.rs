use ferrous_recon_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}

/// Logged once the subscriber is installed, which needs the loaded config first.
pub fn log_config(config_path: Option<&str>, config: &Config) {
    let types: Vec<&str> = config
        .enumeration
        .record_types
        .iter()
        .map(|t| t.as_str())
        .collect();
    info!(
        config_file = config_path.unwrap_or("default"),
        domains = config.enumeration.domains.len(),
        names = config.enumeration.names.len(),
        resolvers = config.resolvers.servers.len(),
        record_types = %types.join(","),
        max_dns_queries = config.enumeration.max_dns_queries,
        timeout_minutes = config.enumeration.timeout_minutes,
        "Configuration loaded"
    );
}
