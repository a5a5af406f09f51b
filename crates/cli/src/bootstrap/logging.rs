use ferrous_recon_application::ports::EventBus;
use ferrous_recon_domain::{BusEvent, Config, LogLevel, LogMessage, Topic};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout carries only resolved names.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    info!("Logging initialized at level: {}", config.logging.level);
}

/// Re-emits bus `Log` messages through `tracing` until `shutdown` fires.
pub fn spawn_log_forwarder(bus: &dyn EventBus, shutdown: CancellationToken) -> JoinHandle<()> {
    let mut subscription = bus.subscribe(Topic::Log);
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                event = subscription.recv() => match event {
                    Some(BusEvent::Log(message)) => emit(&message),
                    Some(_) => {}
                    None => break,
                },
                _ = shutdown.cancelled() => {
                    while let Some(event) = subscription.try_recv() {
                        if let BusEvent::Log(message) = event {
                            emit(&message);
                        }
                    }
                    break;
                }
            }
        }
    })
}

fn emit(message: &LogMessage) {
    let origin = &*message.origin;
    match message.level {
        LogLevel::Debug => debug!(origin, "{}", message.message),
        LogLevel::Info => info!(origin, "{}", message.message),
        LogLevel::Warn => warn!(origin, "{}", message.message),
        LogLevel::Error => error!(origin, "{}", message.message),
    }
}
