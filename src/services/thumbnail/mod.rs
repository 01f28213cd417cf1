//! Thumbnail generation pipeline
//!
//! - format: extension to codec resolution
//! - resize: proportional target-height computation
//! - processor: decode and per-width re-encoding
//! - webp: optional lossy conversion through an external encoder
//! - service: the orchestrator fanning one source out into N variants
//! - store: object store collaborator
//! - consumer: Kafka edge feeding the service

pub mod consumer;
pub mod format;
pub mod processor;
pub mod resize;
pub mod service;
pub mod store;
pub mod webp;

pub use consumer::{ConsumerConfig, ThumbnailConsumer};
pub use format::CodecChoice;
pub use processor::ThumbnailRenderer;
pub use resize::ResizePlan;
pub use service::{ThumbnailService, ThumbnailServiceConfig};
pub use store::{HttpBlobStore, ObjectStore};
pub use webp::{CwebpTransform, WebpTransform};
