//! Downscaled before/after previews of a yaw rotation.
//!
//! Previews are meant for interactive shells: the source is shrunk to fit a
//! small bounding box first, then rotated, so the cost is independent of the
//! panorama's resolution. The shift is recomputed for the preview width, so
//! it can differ by a column from the full-size result.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use thiserror::Error;

use crate::decode::{decode_file, DecodeError};
use crate::transform::{column_shift, rotate_yaw, TransformError};

/// Default bounding box for previews (width, height).
pub const DEFAULT_PREVIEW_BOUNDS: (u32, u32) = (400, 200);

/// Gap between the two halves of a side-by-side preview.
const SIDE_BY_SIDE_GAP: u32 = 8;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Preview bounds must be non-zero, got {0}x{1}")]
    InvalidBounds(u32, u32),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// A thumbnail of the source and the same thumbnail rotated.
#[derive(Debug, Clone)]
pub struct Preview {
    pub original: DynamicImage,
    pub rotated: DynamicImage,
    pub angle_degrees: f64,
    /// Column shift applied at preview resolution.
    pub shift: u32,
}

impl Preview {
    /// Compose both thumbnails next to each other on a transparent canvas.
    pub fn side_by_side(&self) -> RgbaImage {
        let left = self.original.to_rgba8();
        let right = self.rotated.to_rgba8();

        let width = left.width() + SIDE_BY_SIDE_GAP + right.width();
        let height = left.height().max(right.height());
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));

        imageops::replace(&mut canvas, &left, 0, 0);
        imageops::replace(&mut canvas, &right, i64::from(left.width() + SIDE_BY_SIDE_GAP), 0);
        canvas
    }
}

/// Build a preview from an already decoded image.
///
/// # Arguments
///
/// * `image` - Full-size panorama
/// * `angle_degrees` - Yaw to preview
/// * `bounds` - Maximum (width, height) of each thumbnail; smaller images are
///   not enlarged
pub fn preview_image(
    image: &DynamicImage,
    angle_degrees: f64,
    bounds: (u32, u32),
) -> Result<Preview, PreviewError> {
    let (max_width, max_height) = bounds;
    if max_width == 0 || max_height == 0 {
        return Err(PreviewError::InvalidBounds(max_width, max_height));
    }

    let (width, height) = fit_within(image.width(), image.height(), max_width, max_height);
    let original = if (width, height) == (image.width(), image.height()) {
        image.clone()
    } else {
        image.resize_exact(width, height, FilterType::Lanczos3)
    };

    let rotated = rotate_yaw(&original, angle_degrees)?;
    Ok(Preview {
        shift: column_shift(original.width(), angle_degrees),
        original,
        rotated,
        angle_degrees,
    })
}

/// Decode a file and build its preview.
pub fn preview_file(
    path: &Path,
    angle_degrees: f64,
    bounds: (u32, u32),
) -> Result<Preview, PreviewError> {
    let panorama = decode_file(path)?;
    preview_image(&panorama.image, angle_degrees, bounds)
}

/// Largest size with the source aspect ratio that fits the box, never larger
/// than the source.
fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = (f64::from(max_width) / f64::from(width)).min(f64::from(max_height) / f64::from(height));
    let new_width = (f64::from(width) * scale).round() as u32;
    let new_height = (f64::from(height) * scale).round() as u32;
    (new_width.clamp(1, max_width), new_height.clamp(1, max_height))
}
