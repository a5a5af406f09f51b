use crate::bootstrap::read_list;
use clap::Parser;
use ferrous_recon_domain::CliOverrides;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ferrous-recon")]
#[command(version)]
#[command(about = "Resolves candidate subdomain names and filters out DNS wildcards")]
pub struct Cli {
    /// Root domain under study (repeatable)
    #[arg(short = 'd', long = "domain")]
    pub domains: Vec<String>,

    /// File with one root domain per line
    #[arg(long = "df")]
    pub domains_file: Option<PathBuf>,

    /// File with known subdomain names to resolve (repeatable)
    #[arg(long = "nf")]
    pub names_files: Vec<PathBuf>,

    /// Known subdomain name to resolve (repeatable)
    #[arg(long = "name")]
    pub names: Vec<String>,

    /// Preferred upstream resolver, IP or IP:port (repeatable)
    #[arg(short = 'r', long = "resolver")]
    pub resolvers: Vec<String>,

    /// File with one resolver per line
    #[arg(long = "rf")]
    pub resolvers_file: Option<PathBuf>,

    /// DNS record type to query (repeatable, default A)
    #[arg(short = 't', long = "type")]
    pub record_types: Vec<String>,

    /// Name that will not be investigated, subdomains included (repeatable)
    #[arg(long = "bl")]
    pub blacklist: Vec<String>,

    /// File with one blacklisted name per line
    #[arg(long = "blf")]
    pub blacklist_file: Option<PathBuf>,

    /// Maximum number of names resolved concurrently
    #[arg(long)]
    pub max_dns_queries: Option<usize>,

    /// Minutes before the run is stopped regardless of activity
    #[arg(long = "timeout")]
    pub timeout_minutes: Option<u64>,

    /// Do not count resolver completions as activity
    #[arg(long)]
    pub noresolvrate: bool,

    /// API key for the WhoisXML reverse-whois source
    #[arg(long = "whoisxml-key")]
    pub whoisxml_key: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long)]
    pub config: Option<String>,

    /// Debug-level logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Folds list files into the inline flags.
    pub fn into_overrides(self) -> anyhow::Result<CliOverrides> {
        let mut domains = self.domains;
        if let Some(path) = &self.domains_file {
            domains.extend(read_list(path)?);
        }

        let mut names = self.names;
        for path in &self.names_files {
            names.extend(read_list(path)?);
        }

        let mut resolvers = self.resolvers;
        if let Some(path) = &self.resolvers_file {
            resolvers.extend(read_list(path)?);
        }

        let mut blacklist = self.blacklist;
        if let Some(path) = &self.blacklist_file {
            blacklist.extend(read_list(path)?);
        }

        Ok(CliOverrides {
            domains,
            names,
            blacklist,
            record_types: self.record_types,
            resolvers,
            max_dns_queries: self.max_dns_queries,
            timeout_minutes: self.timeout_minutes,
            disable_resolver_rate: self.noresolvrate,
            whoisxml_api_key: self.whoisxml_key,
            log_level: self.verbose.then(|| "debug".to_string()),
        })
    }
}
