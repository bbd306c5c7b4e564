//! Order Consumer - Main entry point
//!
//! Reads order events from the orders topic, simulates processing and commits
//! each offset after processing. Runs until SIGINT/SIGTERM, then leaves the
//! consumer group.

use anyhow::Result;
use order_consumer::{ConsumerConfig, ConsumerLoop, KafkaOrderSource, SimulatedProcessor};
use order_events::shutdown::forward_signals;
use order_events::telemetry::init_tracing;
use order_events::KafkaSettings;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("order_consumer=debug,order_events=info,rdkafka=warn,info");

    info!("Starting order consumer");

    let settings = KafkaSettings::from_env().map_err(|e| {
        error!("Failed to load Kafka settings: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;
    let config = ConsumerConfig::from_env().map_err(|e| {
        error!("Failed to load consumer configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let source = KafkaOrderSource::new(&settings).map_err(|e| {
        error!("Failed to create Kafka consumer: {}", e);
        anyhow::anyhow!("Kafka consumer error: {}", e)
    })?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(forward_signals(shutdown_tx));

    let processor = SimulatedProcessor::new(config.stage_delays());
    let consumer = ConsumerLoop::new(source, processor, config.loop_config());
    let stats = consumer.run(shutdown_rx).await;

    info!(
        committed = stats.committed,
        skipped = stats.skipped,
        consume_errors = stats.consume_errors,
        "Order consumer shut down"
    );

    Ok(())
}
