//! Kafka consumer for blob-created events
//!
//! Listens for blob-created notifications and triggers thumbnail generation.
//! Pipeline failures are logged and the loop keeps consuming; retry and
//! dead-lettering belong to the transport.

use std::sync::Arc;

use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::{Headers, Message};
use rdkafka::ClientConfig;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, Result};

use super::service::ThumbnailService;
use super::store::ObjectStore;

/// Kafka consumer configuration
#[derive(Clone, Debug)]
pub struct ConsumerConfig {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            topic: "blob_events".to_string(),
            group_id: "thumbnail-worker".to_string(),
        }
    }
}

/// Blob-created event payload
#[derive(Debug, serde::Deserialize)]
struct BlobCreatedEvent {
    url: Option<String>,
    #[allow(dead_code)]
    content_type: Option<String>,
    #[allow(dead_code)]
    content_length: Option<i64>,
}

#[derive(Debug, serde::Deserialize)]
struct EventEnvelope<T> {
    data: T,
}

/// Kafka consumer driving the thumbnail service
pub struct ThumbnailConsumer<S: ObjectStore + 'static> {
    consumer: StreamConsumer,
    service: Arc<ThumbnailService<S>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<S: ObjectStore + 'static> ThumbnailConsumer<S> {
    /// Create a new consumer subscribed to the blob-events topic
    pub fn new(
        config: &ConsumerConfig,
        service: Arc<ThumbnailService<S>>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", "5000")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "45000")
            .set("max.poll.interval.ms", "300000")
            .create()
            .map_err(|e| AppError::Event(format!("failed to create Kafka consumer: {e}")))?;

        consumer
            .subscribe(&[&config.topic])
            .map_err(|e| AppError::Event(format!("failed to subscribe to topic: {e}")))?;

        info!(
            brokers = %config.brokers,
            topic = %config.topic,
            group_id = %config.group_id,
            "blob-created consumer initialized"
        );

        Ok(Self {
            consumer,
            service,
            shutdown_rx,
        })
    }

    /// Run the consumer loop until shutdown
    pub async fn run(&mut self) -> Result<()> {
        use futures::StreamExt;

        info!("starting blob-created consumer loop");

        let mut message_stream = self.consumer.stream();

        loop {
            tokio::select! {
                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("shutdown signal received, stopping consumer");
                        break;
                    }
                }

                message = message_stream.next() => {
                    match message {
                        Some(Ok(msg)) => {
                            if let Err(e) = self.process_message(&msg).await {
                                error!(error = %e, "failed to process message");
                            }
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "Kafka consumer error");
                        }
                        None => {
                            warn!("message stream ended unexpectedly");
                            break;
                        }
                    }
                }
            }
        }

        info!("blob-created consumer stopped");
        Ok(())
    }

    /// Process a single blob-created message
    async fn process_message<M: Message>(&self, msg: &M) -> Result<()> {
        let payload = match msg.payload() {
            Some(p) => p,
            None => {
                debug!("empty message payload, skipping");
                return Ok(());
            }
        };

        if let Some(event_type) = header_value(msg, "event_type") {
            if !matches!(event_type, "blob.created" | "BlobCreated") {
                debug!(event_type = %event_type, "ignoring non blob-created event");
                return Ok(());
            }
        }

        let event: BlobCreatedEvent = match parse_enveloped_or_direct(payload) {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "failed to parse message payload, skipping");
                return Ok(());
            }
        };

        let url = match event.url {
            Some(url) => url,
            None => {
                warn!("blob-created event missing url, skipping");
                return Ok(());
            }
        };

        debug!(url = %url, "received blob-created event");

        match self.service.process_url(&url).await {
            Ok(written) => {
                info!(url = %url, variants = written, "thumbnails generated");
            }
            Err(e) => {
                // the transport owns retry; log and keep consuming
                error!(url = %url, error = %e, "thumbnail generation failed");
            }
        }

        Ok(())
    }
}

fn parse_enveloped_or_direct(payload: &[u8]) -> Result<BlobCreatedEvent> {
    if let Ok(envelope) = serde_json::from_slice::<EventEnvelope<BlobCreatedEvent>>(payload) {
        return Ok(envelope.data);
    }

    Ok(serde_json::from_slice::<BlobCreatedEvent>(payload)?)
}

fn header_value<'a, M: Message>(message: &'a M, key: &str) -> Option<&'a str> {
    message
        .headers()
        .and_then(|headers| {
            headers
                .iter()
                .find(|header| header.key == key)
                .and_then(|header| header.value)
        })
        .and_then(|value| std::str::from_utf8(value).ok())
}
