//! Re-encoding a pixel buffer into its source container.
//!
//! JPEG and PNG get explicit quality settings; the remaining containers are
//! written with the `image` crate's default encoder for that format.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{self, PngEncoder};
use image::{ColorType, DynamicImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::SourceFormat;

/// Default JPEG quality, matching what users expect from a "save as original".
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The container cannot hold this pixel layout (e.g. RGBA in JPEG).
    #[error("{format} cannot store {color:?} pixels")]
    UnsupportedFormat {
        format: &'static str,
        color: ColorType,
    },

    /// The codec rejected the data.
    #[error("{format} encoding failed: {reason}")]
    EncodingFailed {
        format: &'static str,
        reason: String,
    },
}

/// PNG compression effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    Default,
    /// Smallest output; slowest.
    #[default]
    Best,
}

impl PngCompression {
    fn to_image_compression(self) -> png::CompressionType {
        match self {
            PngCompression::Fast => png::CompressionType::Fast,
            PngCompression::Default => png::CompressionType::Default,
            PngCompression::Best => png::CompressionType::Best,
        }
    }
}

/// Quality settings applied when writing results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// JPEG quality (1-100). Values outside the range are clamped.
    pub jpeg_quality: u8,
    /// PNG compression effort.
    pub png_compression: PngCompression,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            png_compression: PngCompression::default(),
        }
    }
}

/// Encode an image into the given container.
///
/// # Arguments
///
/// * `image` - Pixels to encode, in any layout the container supports
/// * `format` - Target container (normally the one the source was read from)
/// * `options` - JPEG quality and PNG compression
///
/// # Returns
///
/// The encoded file contents.
///
/// # Errors
///
/// Returns `EncodeError::UnsupportedFormat` when the container cannot store
/// the pixel layout, and `EncodeError::EncodingFailed` for codec failures.
pub fn encode(
    image: &DynamicImage,
    format: SourceFormat,
    options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let color = image.color();
    if !container_accepts(format, color) {
        return Err(EncodeError::UnsupportedFormat {
            format: format.name(),
            color,
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    let written = match format {
        SourceFormat::Jpeg => {
            let quality = options.jpeg_quality.clamp(1, 100);
            image.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))
        }
        SourceFormat::Png => image.write_with_encoder(PngEncoder::new_with_quality(
            &mut buffer,
            options.png_compression.to_image_compression(),
            png::FilterType::Adaptive,
        )),
        other => image.write_to(&mut buffer, other.to_image_format()),
    };

    written.map_err(|e| EncodeError::EncodingFailed {
        format: format.name(),
        reason: e.to_string(),
    })?;

    Ok(buffer.into_inner())
}

/// Whether a container can store the given pixel layout without conversion.
fn container_accepts(format: SourceFormat, color: ColorType) -> bool {
    match format {
        SourceFormat::Jpeg => matches!(color, ColorType::L8 | ColorType::Rgb8),
        SourceFormat::Png => matches!(
            color,
            ColorType::L8
                | ColorType::L16
                | ColorType::Rgb8
                | ColorType::Rgb16
                | ColorType::Rgba8
                | ColorType::Rgba16
        ),
        SourceFormat::Bmp | SourceFormat::WebP => {
            matches!(color, ColorType::L8 | ColorType::Rgb8 | ColorType::Rgba8)
        }
        SourceFormat::Tiff => !matches!(color, ColorType::La8 | ColorType::La16),
    }
}
