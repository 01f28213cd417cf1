//! Thumbnail renderer - decodes a source image and re-encodes variants
//!
//! Decode happens once per invocation; each variant works on its own resized
//! buffer, so the shared decode is never mutated.
//!
//! All of this is CPU-bound. The pipeline wraps calls in `spawn_blocking` to
//! keep the async runtime free.

use std::io::Cursor;

use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::{AppError, Result};

use super::format::CodecChoice;
use super::resize::ResizePlan;

/// Renders one encoded variant from the shared decoded source
#[derive(Clone, Debug)]
pub struct ThumbnailRenderer {
    jpeg_quality: u8,
}

impl ThumbnailRenderer {
    pub fn new(jpeg_quality: u8) -> Self {
        Self { jpeg_quality }
    }

    /// Decode source bytes into pixels
    pub fn decode(data: &[u8]) -> Result<DynamicImage> {
        let img =
            image::load_from_memory(data).map_err(|e| AppError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();
        debug!(width, height, "decoded source image");
        Ok(img)
    }

    /// Produce one encoded variant: resize if the target is smaller than the
    /// source, then re-encode with the resolved codec.
    pub fn render(
        &self,
        source: &DynamicImage,
        codec: CodecChoice,
        target_width: u32,
    ) -> Result<Bytes> {
        let (orig_w, orig_h) = source.dimensions();

        match ResizePlan::compute(orig_w, orig_h, target_width)? {
            ResizePlan::Keep => self.encode(source, codec),
            ResizePlan::Scale { width, height } => {
                let resized = source.resize_exact(width, height.max(1), FilterType::Triangle);
                self.encode(&resized, codec)
            }
        }
    }

    /// Encode at current dimensions, no resize
    ///
    /// Used by the WebP path, where the external transform owns the resize.
    pub fn encode(&self, image: &DynamicImage, codec: CodecChoice) -> Result<Bytes> {
        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);

        image
            .write_to(&mut cursor, codec.output_format(self.jpeg_quality)?)
            .map_err(|e| AppError::Encode(e.to_string()))?;

        Ok(Bytes::from(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn source(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([64, 128, 32])))
    }

    fn rendered_dimensions(renderer: &ThumbnailRenderer, img: &DynamicImage, width: u32) -> (u32, u32) {
        let bytes = renderer.render(img, CodecChoice::Png, width).unwrap();
        let decoded = ThumbnailRenderer::decode(&bytes).unwrap();
        decoded.dimensions()
    }

    #[test]
    fn test_render_scales_proportionally() {
        let renderer = ThumbnailRenderer::new(85);
        assert_eq!(rendered_dimensions(&renderer, &source(1000, 800), 100), (100, 80));
        assert_eq!(rendered_dimensions(&renderer, &source(1000, 500), 400), (400, 200));
    }

    #[test]
    fn test_render_keeps_small_sources() {
        let renderer = ThumbnailRenderer::new(85);
        assert_eq!(rendered_dimensions(&renderer, &source(640, 480), 800), (640, 480));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            ThumbnailRenderer::decode(b"definitely not an image"),
            Err(AppError::Decode(_))
        ));
    }

    #[test]
    fn test_encode_jpeg_roundtrip() {
        let renderer = ThumbnailRenderer::new(85);
        let bytes = renderer.encode(&source(32, 32), CodecChoice::Jpeg).unwrap();
        let decoded = ThumbnailRenderer::decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (32, 32));
    }
}
