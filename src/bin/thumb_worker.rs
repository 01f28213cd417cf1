//! Thumbnail Worker - Kafka consumer for blob-created thumbnail generation
//!
//! Listens for blob-created events and writes resized variants back to the
//! configured destination container.
//!
//! Environment variables:
//! - BLOB_STORE_ENDPOINT: Base URL of the blob store
//! - BLOB_STORE_ACCESS_TOKEN: Optional access-token query string
//! - THUMBNAIL_WIDTHS: Comma-separated target widths (e.g. "100,500")
//! - THUMBNAIL_CONTAINER_NAME: Destination container for variants
//! - WEBP_SUPPORT: Set to "true" to route variants through cwebp
//! - CWEBP_PATH: Path to the cwebp binary (default: "cwebp")
//! - WEBP_QUALITY: WebP quality 0-100 (default: 90)
//! - JPEG_QUALITY: JPEG quality 0-100 (default: 85)
//! - KAFKA_BROKERS: Kafka broker addresses (default: "localhost:9092")
//! - KAFKA_TOPIC: Topic to consume (default: "blob_events")
//! - KAFKA_GROUP_ID: Consumer group ID (default: "thumbnail-worker")

use std::sync::Arc;

use anyhow::Context;
use thumbnail_service::services::thumbnail::{
    ConsumerConfig, CwebpTransform, HttpBlobStore, ThumbnailConsumer, ThumbnailService,
    ThumbnailServiceConfig, WebpTransform,
};
use thumbnail_service::Config;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("thumb_worker=info".parse().expect("valid directive"))
                .add_directive("thumbnail_service=info".parse().expect("valid directive")),
        )
        .init();

    info!("Starting Thumbnail Worker");

    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        container = %config.thumbnails.container,
        widths = ?config.thumbnails.widths,
        webp = config.thumbnails.webp_mode,
        kafka_brokers = %config.kafka.brokers,
        kafka_topic = %config.kafka.topic,
        "Configuration loaded"
    );

    let store = Arc::new(HttpBlobStore::new(
        &config.store.endpoint,
        config.store.access_token.clone(),
    )?);

    let transform: Option<Arc<dyn WebpTransform>> = if config.thumbnails.webp_mode {
        Some(Arc::new(CwebpTransform::new(
            config.thumbnails.cwebp_path.clone(),
            config.thumbnails.webp_quality,
        )))
    } else {
        None
    };

    let service_config = ThumbnailServiceConfig {
        widths: config.thumbnails.widths.clone(),
        container: config.thumbnails.container.clone(),
        webp_mode: config.thumbnails.webp_mode,
        jpeg_quality: config.thumbnails.jpeg_quality,
    };
    let service = Arc::new(ThumbnailService::new(store, transform, service_config)?);
    info!("Thumbnail service initialized");

    // Handle SIGTERM/SIGINT for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl+c");
        info!("Shutdown signal received");
        let _ = shutdown_tx_clone.send(true);
    });

    let consumer_config = ConsumerConfig {
        brokers: config.kafka.brokers.clone(),
        topic: config.kafka.topic.clone(),
        group_id: config.kafka.group_id.clone(),
    };
    let mut consumer = ThumbnailConsumer::new(&consumer_config, service, shutdown_rx)?;
    info!("Kafka consumer initialized");

    if let Err(e) = consumer.run().await {
        error!(error = %e, "Consumer error");
    }

    info!("Thumbnail Worker stopped");
    Ok(())
}
