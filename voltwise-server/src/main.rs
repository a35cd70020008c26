use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;
use voltwise_common::MAX_BINS;
use voltwise_server::config::{ServerSettings, DEFAULT_ADDRESS};
use voltwise_server::{Server, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "voltwise-server", about = "Risk-distribution analytics service")]
struct Args {
    /// Address to listen on (overrides the settings file).
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Path to a JSON settings file.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Emit synthetic pulse chatter every N milliseconds (0 disables).
    #[arg(long)]
    chatter_ms: Option<u64>,

    /// Histogram bin count used when a request does not specify one.
    #[arg(long)]
    bins: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => ServerSettings::load(path)?,
        None => ServerSettings::default(),
    };
    if let Some(ms) = args.chatter_ms {
        settings.chatter_interval_ms = Some(ms);
    }

    let address: SocketAddr = match args.addr {
        Some(addr) => addr,
        None => settings.address.as_deref().unwrap_or(DEFAULT_ADDRESS).parse()?,
    };

    let default_bins = args.bins.or(settings.default_bins).unwrap_or(voltwise_common::DEFAULT_BINS);
    if !(1..=MAX_BINS).contains(&default_bins) {
        return Err(format!("default bin count must be between 1 and {}", MAX_BINS).into());
    }

    let config = ServerConfig {
        address,
        default_bins,
        chatter_interval: settings.chatter_interval(),
    };

    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();

    // Print "Listening on <addr>" once the server signals it is bound.
    tokio::spawn(async move {
        if let Ok(addr) = ready_rx.await {
            println!("Listening on {}", addr);
        }
    });

    if let Some(interval) = config.chatter_interval {
        tracing::info!(interval_ms = interval.as_millis() as u64, "synthetic chatter enabled");
    }

    Server::new(config).run(ready_tx).await?;
    Ok(())
}
