use anyhow::{Context, Result};
use broker_bus::{config, feed, signal::shutdown_signal, Broker, BrokerConfig};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Publishes every line read from stdin as a message of the type given as the first
/// argument (default `text`), until stdin closes or a shutdown signal arrives.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match config::find_config_file() {
        Ok(path) => BrokerConfig::from_file(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        Err(_) => BrokerConfig::from_env().context("Failed to load configuration from environment")?,
    };
    let message_type = std::env::args().nth(1).unwrap_or_else(|| "text".to_string());

    let mut broker = Broker::new(&config)?;
    broker.connect().await.context("Failed to connect to RabbitMQ")?;

    let published = feed::publish_lines_then_close(
        &mut broker,
        &message_type,
        BufReader::new(tokio::io::stdin()),
        shutdown_signal(),
    )
    .await
    .context("Publishing from stdin failed")?;

    info!(published, "Broker closed");
    Ok(())
}
