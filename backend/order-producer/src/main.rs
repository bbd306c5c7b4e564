//! Order Producer - Main entry point
//!
//! Publishes a synthetic order to the orders topic every few seconds until
//! SIGINT/SIGTERM, then flushes outstanding records and exits.

use anyhow::Result;
use order_events::shutdown::forward_signals;
use order_events::telemetry::init_tracing;
use order_events::KafkaSettings;
use order_producer::{KafkaOrderPublisher, ProducerConfig, ProducerLoop};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("order_producer=debug,order_events=info,rdkafka=warn,info");

    info!("Starting order producer");

    let settings = KafkaSettings::from_env().map_err(|e| {
        error!("Failed to load Kafka settings: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;
    let config = ProducerConfig::from_env().map_err(|e| {
        error!("Failed to load producer configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let publisher = KafkaOrderPublisher::new(&settings, config.delivery_timeout()).map_err(|e| {
        error!("Failed to create Kafka producer: {}", e);
        anyhow::anyhow!("Kafka producer error: {}", e)
    })?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(forward_signals(shutdown_tx));

    let producer = ProducerLoop::new(publisher, config.loop_config(), StdRng::from_entropy());
    let stats = producer.run(shutdown_rx).await;

    info!(
        published = stats.published,
        failed = stats.failed,
        "Order producer shut down"
    );

    Ok(())
}
