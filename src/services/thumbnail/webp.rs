//! WebP transform - lossy conversion through an external encoder
//!
//! The transform receives an already-rendered full-size buffer and performs
//! the resize itself (height derived from the aspect ratio), so it is
//! mutually exclusive with the renderer's own resize for the same width.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{AppError, Result};

/// Pluggable lossy conversion capability
///
/// Swapping in a native in-process encoder only requires another
/// implementation; the pipeline is unaware of the external binary.
#[async_trait]
pub trait WebpTransform: Send + Sync {
    /// Convert an encoded image to WebP, resized to `target_width`
    async fn transform(&self, data: &[u8], target_width: u32) -> Result<Bytes>;
}

/// `cwebp`-backed transform
///
/// Resize is delegated to cwebp (`-resize width 0`, height auto). Alpha is
/// blended against a white background rather than preserved.
pub struct CwebpTransform {
    binary: PathBuf,
    quality: u8,
}

static SCRATCH_ID: AtomicU64 = AtomicU64::new(0);

impl CwebpTransform {
    pub fn new(binary: impl Into<PathBuf>, quality: u8) -> Self {
        Self {
            binary: binary.into(),
            quality,
        }
    }

    fn scratch_paths(&self) -> (PathBuf, PathBuf) {
        let id = SCRATCH_ID.fetch_add(1, Ordering::Relaxed);
        let pid = std::process::id();
        let dir = std::env::temp_dir();
        (
            dir.join(format!("thumb-{pid}-{id}.src")),
            dir.join(format!("thumb-{pid}-{id}.webp")),
        )
    }

    async fn run(&self, input: &Path, output: &Path, target_width: u32) -> Result<Bytes> {
        let out = Command::new(&self.binary)
            .arg("-q")
            .arg(self.quality.to_string())
            .arg("-resize")
            .arg(target_width.to_string())
            .arg("0")
            .arg("-blend_alpha")
            .arg("0xffffff")
            .arg("-mt")
            .arg(input)
            .arg("-o")
            .arg(output)
            .output()
            .await
            .map_err(|e| {
                AppError::Transform(format!("failed to run {}: {e}", self.binary.display()))
            })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(AppError::Transform(format!(
                "cwebp exited with {}: {}",
                out.status,
                stderr.trim()
            )));
        }

        let bytes = tokio::fs::read(output)
            .await
            .map_err(|e| AppError::Transform(format!("failed to read cwebp output: {e}")))?;

        debug!(size = bytes.len(), width = target_width, "webp transform complete");
        Ok(Bytes::from(bytes))
    }
}

#[async_trait]
impl WebpTransform for CwebpTransform {
    async fn transform(&self, data: &[u8], target_width: u32) -> Result<Bytes> {
        let (input, output) = self.scratch_paths();

        tokio::fs::write(&input, data)
            .await
            .map_err(|e| AppError::Transform(format!("failed to stage cwebp input: {e}")))?;

        let result = self.run(&input, &output, target_width).await;

        // scratch files are removed on success and failure alike
        if let Err(e) = tokio::fs::remove_file(&input).await {
            warn!(path = %input.display(), error = %e, "failed to remove cwebp scratch input");
        }
        if let Err(e) = tokio::fs::remove_file(&output).await {
            if result.is_ok() {
                warn!(path = %output.display(), error = %e, "failed to remove cwebp scratch output");
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_a_transform_error() {
        let transform = CwebpTransform::new("/nonexistent/cwebp", 90);
        let err = transform.transform(b"bytes", 300).await.unwrap_err();
        assert!(matches!(err, AppError::Transform(_)));
    }

    #[test]
    fn test_scratch_paths_are_unique() {
        let transform = CwebpTransform::new("cwebp", 90);
        let (in_a, out_a) = transform.scratch_paths();
        let (in_b, out_b) = transform.scratch_paths();
        assert_ne!(in_a, in_b);
        assert_ne!(out_a, out_b);
    }
}
