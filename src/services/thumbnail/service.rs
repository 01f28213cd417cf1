//! Thumbnail service - orchestrates the derivation pipeline
//!
//! One invocation: resolve the codec from the source extension, decode once,
//! then fan out one task per configured width. Each task renders (and in
//! WebP mode converts) its variant and hands it to the object store. The
//! service joins every task before reporting, so completion means all writes
//! have finished; a failed width is logged and skipped without aborting its
//! siblings.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, info};
use url::Url;

use crate::error::{AppError, Result};

use super::format::CodecChoice;
use super::processor::ThumbnailRenderer;
use super::store::ObjectStore;
use super::webp::WebpTransform;

/// Inserted between the base name and the width in variant names
const THUMBNAIL_POSTFIX: &str = "-thumbnail-";

/// Thumbnail service configuration
#[derive(Clone, Debug)]
pub struct ThumbnailServiceConfig {
    /// Target widths, one variant per entry
    pub widths: Vec<u32>,
    /// Destination container for variants
    pub container: String,
    /// Route every variant through the WebP transform
    pub webp_mode: bool,
    /// JPEG quality (0-100) for native re-encoding
    pub jpeg_quality: u8,
}

/// Thumbnail service generating resized variants for uploaded blobs
pub struct ThumbnailService<S: ObjectStore> {
    store: Arc<S>,
    transform: Option<Arc<dyn WebpTransform>>,
    renderer: ThumbnailRenderer,
    config: ThumbnailServiceConfig,
}

impl<S: ObjectStore + 'static> ThumbnailService<S> {
    /// Create a new thumbnail service
    ///
    /// WebP mode requires a transform implementation.
    pub fn new(
        store: Arc<S>,
        transform: Option<Arc<dyn WebpTransform>>,
        config: ThumbnailServiceConfig,
    ) -> Result<Self> {
        if config.webp_mode && transform.is_none() {
            return Err(AppError::Config(
                "webp mode enabled but no webp transform provided".to_string(),
            ));
        }

        let renderer = ThumbnailRenderer::new(config.jpeg_quality);

        Ok(Self {
            store,
            transform,
            renderer,
            config,
        })
    }

    /// Process a blob announced by its URL: download the source from its
    /// container and derive all configured variants.
    pub async fn process_url(&self, blob_url: &str) -> Result<u32> {
        let (source_container, blob_name) = parse_blob_url(blob_url)?;

        let Some((extension, codec)) = resolve_source(&blob_name) else {
            info!(blob = %blob_name, "no encoder support, skipping");
            return Ok(0);
        };

        let data = self.store.download(&source_container, &blob_name).await?;
        self.fan_out(&blob_name, &extension, codec, data).await
    }

    /// Process a blob whose bytes are already in hand
    pub async fn process_bytes(&self, blob_name: &str, data: Bytes) -> Result<u32> {
        let Some((extension, codec)) = resolve_source(blob_name) else {
            info!(blob = %blob_name, "no encoder support, skipping");
            return Ok(0);
        };

        self.fan_out(blob_name, &extension, codec, data).await
    }

    /// Decode once, then spawn one render-and-upload task per width and join
    /// them all. Returns the number of variants written.
    async fn fan_out(
        &self,
        blob_name: &str,
        source_ext: &str,
        codec: CodecChoice,
        data: Bytes,
    ) -> Result<u32> {
        let image = tokio::task::spawn_blocking(move || ThumbnailRenderer::decode(&data))
            .await
            .map_err(|e| AppError::Internal(format!("decode task panicked: {e}")))??;
        let image = Arc::new(image);

        let target_ext = if self.config.webp_mode {
            "webp".to_string()
        } else {
            source_ext.to_string()
        };
        let content_type = format!("image/{target_ext}");

        let mut tasks = Vec::with_capacity(self.config.widths.len());
        for &width in &self.config.widths {
            let image = Arc::clone(&image);
            let renderer = self.renderer.clone();
            let store = Arc::clone(&self.store);
            let transform = if self.config.webp_mode {
                self.transform.clone()
            } else {
                None
            };
            let name = variant_name(blob_name, width, &target_ext);
            let container = self.config.container.clone();
            let content_type = content_type.clone();

            tasks.push((
                width,
                tokio::spawn(async move {
                    let encoded = match transform {
                        // WebP mode: encode full-size, the transform owns the
                        // single resize for this width
                        Some(transform) => {
                            let renderer = renderer.clone();
                            let source = Arc::clone(&image);
                            let full =
                                tokio::task::spawn_blocking(move || renderer.encode(&source, codec))
                                    .await
                                    .map_err(|e| {
                                        AppError::Internal(format!("encode task panicked: {e}"))
                                    })??;
                            transform.transform(&full, width).await?
                        }
                        None => {
                            tokio::task::spawn_blocking(move || {
                                renderer.render(&image, codec, width)
                            })
                            .await
                            .map_err(|e| AppError::Internal(format!("render task panicked: {e}")))??
                        }
                    };

                    store.upload(&container, &name, encoded, &content_type).await?;
                    Ok::<String, AppError>(name)
                }),
            ));
        }

        let mut written = 0u32;
        for (width, task) in tasks {
            match task.await {
                Ok(Ok(name)) => {
                    debug!(width, name = %name, "variant written");
                    written += 1;
                }
                Ok(Err(e)) => {
                    error!(width, error = %e, "variant failed, skipping");
                }
                Err(e) => {
                    error!(width, error = %e, "variant task panicked");
                }
            }
        }

        info!(
            blob = %blob_name,
            written,
            requested = self.config.widths.len(),
            "thumbnail generation complete"
        );
        Ok(written)
    }
}

/// Extract the source extension and resolve its codec; `None` short-circuits
/// the pipeline as a no-op.
fn resolve_source(blob_name: &str) -> Option<(String, CodecChoice)> {
    let extension = std::path::Path::new(blob_name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();

    let codec = CodecChoice::from_extension(&extension);
    codec.is_supported().then_some((extension, codec))
}

/// Split a blob URL into its container (first path segment) and blob name
/// (the remaining path)
fn parse_blob_url(blob_url: &str) -> Result<(String, String)> {
    let url = Url::parse(blob_url)
        .map_err(|e| AppError::Event(format!("invalid blob url '{blob_url}': {e}")))?;

    let mut segments = url
        .path_segments()
        .ok_or_else(|| AppError::Event(format!("blob url '{blob_url}' has no path")))?;

    let container = segments
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Event(format!("blob url '{blob_url}' has no container")))?
        .to_string();

    let name = segments.collect::<Vec<_>>().join("/");
    if name.is_empty() {
        return Err(AppError::Event(format!(
            "blob url '{blob_url}' has no blob name"
        )));
    }

    Ok((container, name))
}

/// Derive a variant name by replacing the extension with
/// `-thumbnail-{width}.{extension}`
fn variant_name(blob_name: &str, width: u32, target_ext: &str) -> String {
    let (dir, file) = match blob_name.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, blob_name),
    };
    let stem = file.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file);

    match dir {
        Some(dir) => format!("{dir}/{stem}{THUMBNAIL_POSTFIX}{width}.{target_ext}"),
        None => format!("{stem}{THUMBNAIL_POSTFIX}{width}.{target_ext}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_name_replaces_extension() {
        assert_eq!(variant_name("photo.png", 100, "png"), "photo-thumbnail-100.png");
        assert_eq!(variant_name("photo.png", 300, "webp"), "photo-thumbnail-300.webp");
    }

    #[test]
    fn test_variant_name_keeps_directories() {
        assert_eq!(
            variant_name("2024/08/photo.jpeg", 500, "jpeg"),
            "2024/08/photo-thumbnail-500.jpeg"
        );
    }

    #[test]
    fn test_variant_name_is_deterministic() {
        assert_eq!(
            variant_name("photo.png", 100, "png"),
            variant_name("photo.png", 100, "png")
        );
    }

    #[test]
    fn test_parse_blob_url() {
        let (container, name) =
            parse_blob_url("https://account.blob.example.net/images/photo.png").unwrap();
        assert_eq!(container, "images");
        assert_eq!(name, "photo.png");

        let (container, name) =
            parse_blob_url("https://account.blob.example.net/uploads/2024/photo.jpg").unwrap();
        assert_eq!(container, "uploads");
        assert_eq!(name, "2024/photo.jpg");
    }

    #[test]
    fn test_parse_blob_url_rejects_missing_parts() {
        assert!(parse_blob_url("not a url").is_err());
        assert!(parse_blob_url("https://account.blob.example.net/").is_err());
        assert!(parse_blob_url("https://account.blob.example.net/images").is_err());
    }

    #[test]
    fn test_resolve_source_gates_extensions() {
        assert!(resolve_source("photo.png").is_some());
        assert!(resolve_source("photo.JPG").is_some());
        assert!(resolve_source("icon.bmp").is_none());
        assert!(resolve_source("no-extension").is_none());
    }
}
