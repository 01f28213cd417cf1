//! Thumbnail Service
//!
//! Worker service that reacts to blob-created events, loads the uploaded
//! image, and derives a set of resized thumbnail variants, writing each back
//! to a destination container with content-type metadata.

pub mod config;
pub mod error;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
