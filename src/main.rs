use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_forwarder::config::{load_config, validation::validate_config, ConfigError, ForwarderConfig};
use api_forwarder::lifecycle::shutdown_signal;
use api_forwarder::observability::logging;
use api_forwarder::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "api-forwarder")]
#[command(version, about = "Same-origin forwarding endpoint for HTTPS APIs")]
struct Args {
    /// Path to a TOML config file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ForwarderConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_file = ?args.config,
        bind_address = %config.listener.bind_address,
        mount_path = %config.forwarder.mount_path,
        max_body_bytes = config.forwarder.max_body_bytes,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
