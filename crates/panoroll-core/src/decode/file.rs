//! Decoding panoramas from disk or memory.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::ImageReader;

use super::{DecodeError, ImageInfo, Panorama, SourceFormat};

/// File extensions accepted into a batch (lowercase, without the dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Returns true if the path carries one of [`SUPPORTED_EXTENSIONS`].
///
/// Only the extension is inspected; the file is not opened.
pub fn is_supported_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(SourceFormat::from_extension)
        .is_some()
}

/// Decode an image from bytes, keeping its native pixel layout.
///
/// The container is sniffed from the magic bytes, not from any file name.
///
/// # Errors
///
/// Returns `DecodeError::CorruptImage` if the bytes cannot be decoded and
/// `DecodeError::UnsupportedFormat` if the container is recognised but not
/// one we can write back.
pub fn decode_bytes(bytes: &[u8]) -> Result<Panorama, DecodeError> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptImage(e.to_string()))?;

    let detected = reader
        .format()
        .ok_or_else(|| DecodeError::CorruptImage("unrecognised image container".to_string()))?;
    let format = SourceFormat::from_image_format(detected)
        .ok_or_else(|| DecodeError::UnsupportedFormat(format!("{detected:?}")))?;

    // Equirectangular panoramas routinely exceed the default allocation limit.
    reader.no_limits();

    let image = reader
        .decode()
        .map_err(|e| DecodeError::CorruptImage(e.to_string()))?;

    Ok(Panorama::new(image, format))
}

/// Read and decode an image file.
///
/// # Errors
///
/// Returns `DecodeError::UnsupportedExtension` if the path is outside
/// [`SUPPORTED_EXTENSIONS`], `DecodeError::Io` if the file cannot be read,
/// otherwise the errors of [`decode_bytes`].
pub fn decode_file(path: &Path) -> Result<Panorama, DecodeError> {
    if !is_supported_path(path) {
        return Err(DecodeError::UnsupportedExtension(path.display().to_string()));
    }
    let bytes = fs::read(path).map_err(|e| DecodeError::Io(e.to_string()))?;
    decode_bytes(&bytes)
}

/// Read dimensions and container of an image file without decoding pixels.
pub fn probe(path: &Path) -> Result<ImageInfo, DecodeError> {
    let reader = ImageReader::open(path)
        .map_err(|e| DecodeError::Io(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| DecodeError::Io(e.to_string()))?;

    let detected = reader
        .format()
        .ok_or_else(|| DecodeError::CorruptImage("unrecognised image container".to_string()))?;
    let format = SourceFormat::from_image_format(detected)
        .ok_or_else(|| DecodeError::UnsupportedFormat(format!("{detected:?}")))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptImage(e.to_string()))?;

    Ok(ImageInfo {
        width,
        height,
        format,
    })
}
