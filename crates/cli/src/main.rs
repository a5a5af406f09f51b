//! # Ferrous Recon
//!
//! Resolves candidate subdomain names for the configured root domains,
//! filters out DNS wildcard answers, and prints every name that resolved.

mod args;
mod bootstrap;
mod di;
mod output;

use args::Cli;
use clap::Parser;
use ferrous_recon_domain::TerminalSignal;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Enumeration failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone();
    let overrides = cli.into_overrides()?;
    let config = bootstrap::load_config(config_path.as_deref(), overrides)?;

    bootstrap::init_logging(&config);
    bootstrap::log_config(config_path.as_deref(), &config);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping enumeration");
                cancel.cancel();
            }
        });
    }

    let services = di::Services::build(&config, &cancel).await?;
    let forwarder_shutdown = CancellationToken::new();
    let forwarder = bootstrap::spawn_log_forwarder(services.bus.as_ref(), forwarder_shutdown.clone());

    let jobs = services.jobs(&config, cancel.child_token());
    let mut stdout = std::io::stdout().lock();
    let outcome = services
        .enumeration(&config)
        .execute(
            config.enumeration.names.clone(),
            move || jobs.start(),
            cancel.clone(),
            |signal| {
                if let TerminalSignal::Resolved(result) = &signal {
                    output::print_result(&mut stdout, result);
                }
            },
        )
        .await;
    drop(stdout);

    forwarder_shutdown.cancel();
    let _ = forwarder.await;

    let summary = outcome?;
    output::log_summary(&summary);
    Ok(())
}
