//! Source format resolution
//!
//! Maps a file extension to a supported codec. Anything outside the
//! allow-list resolves to `Unsupported`, which short-circuits the pipeline
//! as a no-op rather than an error.

use image::ImageOutputFormat;

use crate::error::{AppError, Result};

/// Codec resolved from the source extension, fixed allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecChoice {
    Png,
    Jpeg,
    Gif,
    Webp,
    Unsupported,
}

impl CodecChoice {
    /// Resolve a codec from a file extension
    ///
    /// Accepts an optional leading dot and is case-insensitive.
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.trim_start_matches('.');
        if ext.eq_ignore_ascii_case("png") {
            CodecChoice::Png
        } else if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
            CodecChoice::Jpeg
        } else if ext.eq_ignore_ascii_case("gif") {
            CodecChoice::Gif
        } else if ext.eq_ignore_ascii_case("webp") {
            CodecChoice::Webp
        } else {
            CodecChoice::Unsupported
        }
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, CodecChoice::Unsupported)
    }

    /// Encoder target for this codec
    ///
    /// `Unsupported` never reaches an encoder because the resolver gates
    /// pipeline entry; if it does, that is an internal consistency error.
    pub fn output_format(self, jpeg_quality: u8) -> Result<ImageOutputFormat> {
        match self {
            CodecChoice::Png => Ok(ImageOutputFormat::Png),
            CodecChoice::Jpeg => Ok(ImageOutputFormat::Jpeg(jpeg_quality)),
            CodecChoice::Gif => Ok(ImageOutputFormat::Gif),
            CodecChoice::Webp => Ok(ImageOutputFormat::WebP),
            CodecChoice::Unsupported => Err(AppError::Internal(
                "encoder requested for unsupported format".to_string(),
            )),
        }
    }
}
