//! Core types for image decoding.

use image::{ColorType, DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The source file could not be read.
    #[error("I/O error: {0}")]
    Io(String),

    /// The bytes are not a decodable image.
    #[error("Corrupted or undecodable image: {0}")]
    CorruptImage(String),

    /// The container decoded, but is not one we can write back.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The file extension is not in the supported set.
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),
}

/// Container formats a panorama can be read from and written back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Jpeg,
    Png,
    Bmp,
    Tiff,
    WebP,
}

impl SourceFormat {
    /// Map the `image` crate's detected format onto a supported container.
    ///
    /// Returns `None` for formats that decode fine but that we do not
    /// re-encode (GIF, AVIF, ...).
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(SourceFormat::Jpeg),
            ImageFormat::Png => Some(SourceFormat::Png),
            ImageFormat::Bmp => Some(SourceFormat::Bmp),
            ImageFormat::Tiff => Some(SourceFormat::Tiff),
            ImageFormat::WebP => Some(SourceFormat::WebP),
            _ => None,
        }
    }

    /// Convert back to the `image` crate's format enum.
    pub fn to_image_format(self) -> ImageFormat {
        match self {
            SourceFormat::Jpeg => ImageFormat::Jpeg,
            SourceFormat::Png => ImageFormat::Png,
            SourceFormat::Bmp => ImageFormat::Bmp,
            SourceFormat::Tiff => ImageFormat::Tiff,
            SourceFormat::WebP => ImageFormat::WebP,
        }
    }

    /// Look up a container from a file extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(SourceFormat::Jpeg),
            "png" => Some(SourceFormat::Png),
            "bmp" => Some(SourceFormat::Bmp),
            "tif" | "tiff" => Some(SourceFormat::Tiff),
            "webp" => Some(SourceFormat::WebP),
            _ => None,
        }
    }

    /// Human-readable name, as shown in batch listings.
    pub fn name(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "JPEG",
            SourceFormat::Png => "PNG",
            SourceFormat::Bmp => "BMP",
            SourceFormat::Tiff => "TIFF",
            SourceFormat::WebP => "WEBP",
        }
    }
}

/// Channel layouts the yaw transform accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelLayout {
    /// Single luminance channel.
    Gray,
    /// Three colour channels.
    Rgb,
    /// Three colour channels plus alpha.
    Rgba,
}

impl ChannelLayout {
    /// Classify a color type, independent of bit depth.
    ///
    /// Luma+alpha (two channels) has no layout and returns `None`.
    pub fn from_color_type(color: ColorType) -> Option<Self> {
        match color {
            ColorType::L8 | ColorType::L16 => Some(ChannelLayout::Gray),
            ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => Some(ChannelLayout::Rgb),
            ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => Some(ChannelLayout::Rgba),
            _ => None,
        }
    }
}

/// Dimensions and container of an image file, read without decoding pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Detected container.
    pub format: SourceFormat,
}

/// A decoded panorama together with the container it came from.
///
/// The pixel buffer keeps its native bit depth and channel layout so the
/// encoder can reproduce the source as closely as possible.
#[derive(Debug, Clone)]
pub struct Panorama {
    /// Decoded pixel data.
    pub image: DynamicImage,
    /// Container the pixels were decoded from.
    pub format: SourceFormat,
}

impl Panorama {
    pub fn new(image: DynamicImage, format: SourceFormat) -> Self {
        Self { image, format }
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_format_from_extension() {
        assert_eq!(SourceFormat::from_extension("JPG"), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_extension("jpeg"), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_extension("Tif"), Some(SourceFormat::Tiff));
        assert_eq!(SourceFormat::from_extension("webp"), Some(SourceFormat::WebP));
        assert_eq!(SourceFormat::from_extension("gif"), None);
        assert_eq!(SourceFormat::from_extension(""), None);
    }

    #[test]
    fn test_source_format_image_format_roundtrip() {
        for format in [
            SourceFormat::Jpeg,
            SourceFormat::Png,
            SourceFormat::Bmp,
            SourceFormat::Tiff,
            SourceFormat::WebP,
        ] {
            assert_eq!(
                SourceFormat::from_image_format(format.to_image_format()),
                Some(format)
            );
        }
        assert_eq!(SourceFormat::from_image_format(ImageFormat::Gif), None);
    }

    #[test]
    fn test_channel_layout_from_color_type() {
        assert_eq!(
            ChannelLayout::from_color_type(ColorType::L8),
            Some(ChannelLayout::Gray)
        );
        assert_eq!(
            ChannelLayout::from_color_type(ColorType::Rgb16),
            Some(ChannelLayout::Rgb)
        );
        assert_eq!(
            ChannelLayout::from_color_type(ColorType::Rgba32F),
            Some(ChannelLayout::Rgba)
        );
        assert_eq!(ChannelLayout::from_color_type(ColorType::La8), None);
        assert_eq!(ChannelLayout::from_color_type(ColorType::La16), None);
    }

    #[test]
    fn test_panorama_accessors() {
        let pano = Panorama::new(DynamicImage::new_rgb8(64, 32), SourceFormat::Png);
        assert_eq!(pano.width(), 64);
        assert_eq!(pano.height(), 32);
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::UnsupportedExtension("gif".to_string());
        assert_eq!(err.to_string(), "Unsupported file extension: gif");

        let err = DecodeError::CorruptImage("bad header".to_string());
        assert_eq!(err.to_string(), "Corrupted or undecodable image: bad header");
    }
}
