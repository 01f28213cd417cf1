/// Configuration management for thumbnail-service
///
/// Loaded once at the binary edge and passed into the pipeline explicitly;
/// core logic never reads the environment.
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub kafka: KafkaConfig,
    pub store: StoreConfig,
    pub thumbnails: ThumbnailOptions,
}

#[derive(Clone, Debug)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub endpoint: String,
    pub access_token: Option<String>,
}

/// Options controlling the derivation pipeline itself
#[derive(Clone, Debug)]
pub struct ThumbnailOptions {
    /// Target widths, one variant per entry; order kept, duplicates dropped
    pub widths: Vec<u32>,
    /// Destination container for variants
    pub container: String,
    /// Force every variant through the WebP transform
    pub webp_mode: bool,
    /// Path to the cwebp binary, used only when `webp_mode` is on
    pub cwebp_path: PathBuf,
    /// WebP quality (0-100)
    pub webp_quality: u8,
    /// JPEG quality (0-100) for native re-encoding
    pub jpeg_quality: u8,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            kafka: KafkaConfig {
                brokers: std::env::var("KAFKA_BROKERS")
                    .unwrap_or_else(|_| "localhost:9092".to_string()),
                topic: std::env::var("KAFKA_TOPIC").unwrap_or_else(|_| "blob_events".to_string()),
                group_id: std::env::var("KAFKA_GROUP_ID")
                    .unwrap_or_else(|_| "thumbnail-worker".to_string()),
            },
            store: StoreConfig {
                endpoint: require("BLOB_STORE_ENDPOINT")?,
                access_token: std::env::var("BLOB_STORE_ACCESS_TOKEN").ok(),
            },
            thumbnails: ThumbnailOptions {
                widths: parse_widths(&require("THUMBNAIL_WIDTHS")?)?,
                container: require("THUMBNAIL_CONTAINER_NAME")?,
                webp_mode: parse_bool(std::env::var("WEBP_SUPPORT").ok().as_deref()),
                cwebp_path: std::env::var("CWEBP_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("cwebp")),
                webp_quality: parse_or("WEBP_QUALITY", 90),
                jpeg_quality: parse_or("JPEG_QUALITY", 85),
            },
        })
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| AppError::Config(format!("{name} not set")))
}

fn parse_or(name: &str, default: u8) -> u8 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_bool(raw: Option<&str>) -> bool {
    raw.map(|val| val == "1" || val.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Parse a comma-separated width list, keeping order and dropping duplicates
fn parse_widths(raw: &str) -> Result<Vec<u32>> {
    let mut widths = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let width: u32 = part
            .parse()
            .map_err(|_| AppError::Config(format!("invalid thumbnail width '{part}'")))?;
        if width == 0 {
            return Err(AppError::Config(
                "thumbnail widths must be positive".to_string(),
            ));
        }
        if !widths.contains(&width) {
            widths.push(width);
        }
    }
    if widths.is_empty() {
        return Err(AppError::Config("THUMBNAIL_WIDTHS is empty".to_string()));
    }
    Ok(widths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_widths_keeps_order_and_dedupes() {
        let widths = parse_widths(" 100, 500 ,100,250").unwrap();
        assert_eq!(widths, vec![100, 500, 250]);
    }

    #[test]
    fn test_parse_widths_rejects_zero() {
        assert!(parse_widths("100,0").is_err());
    }

    #[test]
    fn test_parse_widths_rejects_garbage() {
        assert!(parse_widths("100,abc").is_err());
    }

    #[test]
    fn test_parse_widths_rejects_empty() {
        assert!(parse_widths(" , ").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool(Some("true")));
        assert!(parse_bool(Some("TRUE")));
        assert!(parse_bool(Some("1")));
        assert!(!parse_bool(Some("0")));
        assert!(!parse_bool(Some("yes")));
        assert!(!parse_bool(None));
    }
}
