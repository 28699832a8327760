//! Cyclic column shift for equirectangular images.
//!
//! # Algorithm
//!
//! For a panorama of width `W` and angle `a`:
//! ```text
//! r     = a reduced into [-180, 180], sign kept
//! shift = round_half_away_from_zero(W * r / 360) mod W
//! out[y][x] = in[y][(x - shift) mod W]
//! ```
//!
//! Because the reduction and the rounding are both symmetric in the sign of
//! the angle, `column_shift(w, -a)` is always the exact inverse of
//! `column_shift(w, a)`. The one place where `a` and `a - 360` disagree is a
//! half turn on an odd width: 180° and -180° round the half-column tie in
//! opposite directions.

use image::{DynamicImage, ImageBuffer, Pixel};
use thiserror::Error;

use crate::decode::ChannelLayout;

/// Errors produced by the yaw transform.
#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    /// Channel layout outside {gray, RGB, RGBA}.
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    /// NaN or infinite angle.
    #[error("Invalid rotation angle: {0}")]
    InvalidAngle(f64),
}

/// Reduce an angle into [-180, 180] degrees, keeping its sign.
///
/// `180` stays `180` and `-180` stays `-180`; everything else lands in the
/// open interval.
pub fn normalize_angle(angle_degrees: f64) -> f64 {
    let reduced = angle_degrees % 360.0;
    if reduced > 180.0 {
        reduced - 360.0
    } else if reduced < -180.0 {
        reduced + 360.0
    } else {
        reduced
    }
}

/// Number of columns content moves right for the given angle, in `[0, width)`.
///
/// Returns 0 for zero-width images and non-finite angles.
///
/// # Example
///
/// ```
/// use panoroll_core::transform::column_shift;
///
/// assert_eq!(column_shift(360, 90.0), 90);
/// assert_eq!(column_shift(360, -90.0), 270);
/// assert_eq!(column_shift(360, 180.0), 180);
/// ```
pub fn column_shift(width: u32, angle_degrees: f64) -> u32 {
    if width == 0 || !angle_degrees.is_finite() {
        return 0;
    }

    // f64::round rounds half away from zero, so the shift is odd in the angle.
    let signed = (f64::from(width) * normalize_angle(angle_degrees) / 360.0).round() as i64;
    signed.rem_euclid(i64::from(width)) as u32
}

/// Cyclically shift every row of an interleaved sample buffer to the right.
///
/// `samples` holds rows of `width` pixels with `channels` samples each. A
/// trailing partial row, if any, is left as is.
pub fn shift_columns<T: Copy>(samples: &[T], width: u32, channels: usize, shift: u32) -> Vec<T> {
    let mut shifted = samples.to_vec();
    shift_rows_in_place(&mut shifted, width, channels, shift);
    shifted
}

fn shift_rows_in_place<T>(samples: &mut [T], width: u32, channels: usize, shift: u32) {
    let row_len = width as usize * channels;
    if row_len == 0 {
        return;
    }
    let offset = (shift % width) as usize * channels;
    if offset == 0 {
        return;
    }
    for row in samples.chunks_exact_mut(row_len) {
        row.rotate_right(offset);
    }
}

fn shift_buffer<P: Pixel>(
    buffer: &ImageBuffer<P, Vec<P::Subpixel>>,
    shift: u32,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let mut shifted = buffer.clone();
    let width = shifted.width();
    let samples: &mut [P::Subpixel] = &mut shifted;
    shift_rows_in_place(samples, width, usize::from(P::CHANNEL_COUNT), shift);
    shifted
}

/// Rotate an equirectangular image around the vertical axis.
///
/// # Arguments
///
/// * `image` - Source panorama (8-bit, 16-bit or float; gray, RGB or RGBA)
/// * `angle_degrees` - Yaw in degrees, positive moves content right
///
/// # Returns
///
/// A new image with the same dimensions, layout and bit depth. A zero shift
/// still returns a copy.
///
/// # Errors
///
/// Returns `TransformError::UnsupportedFormat` for luma+alpha or any other
/// layout outside {1, 3, 4} channels, and `TransformError::InvalidAngle`
/// for NaN or infinite angles.
pub fn rotate_yaw(image: &DynamicImage, angle_degrees: f64) -> Result<DynamicImage, TransformError> {
    if ChannelLayout::from_color_type(image.color()).is_none() {
        return Err(TransformError::UnsupportedFormat(format!(
            "{:?}",
            image.color()
        )));
    }
    if !angle_degrees.is_finite() {
        return Err(TransformError::InvalidAngle(angle_degrees));
    }

    let shift = column_shift(image.width(), angle_degrees);
    if shift == 0 {
        return Ok(image.clone());
    }

    let rotated = match image {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(shift_buffer(buf, shift)),
        DynamicImage::ImageLuma16(buf) => DynamicImage::ImageLuma16(shift_buffer(buf, shift)),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(shift_buffer(buf, shift)),
        DynamicImage::ImageRgb16(buf) => DynamicImage::ImageRgb16(shift_buffer(buf, shift)),
        DynamicImage::ImageRgb32F(buf) => DynamicImage::ImageRgb32F(shift_buffer(buf, shift)),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(shift_buffer(buf, shift)),
        DynamicImage::ImageRgba16(buf) => DynamicImage::ImageRgba16(shift_buffer(buf, shift)),
        DynamicImage::ImageRgba32F(buf) => DynamicImage::ImageRgba32F(shift_buffer(buf, shift)),
        other => {
            return Err(TransformError::UnsupportedFormat(format!(
                "{:?}",
                other.color()
            )))
        }
    };

    Ok(rotated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma, LumaA, Rgb, RgbImage, Rgba, RgbaImage};

    const MARKER: Rgb<u8> = Rgb([255, 0, 0]);

    /// Black image with a single red column at `marker_x`.
    fn marker_image(width: u32, height: u32, marker_x: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, _| {
            if x == marker_x {
                MARKER
            } else {
                Rgb([0, 0, 0])
            }
        }))
    }

    /// Image where every column has a distinct colour.
    fn column_coded(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, (x >> 8) as u8, y as u8]))
    }

    // ===================== Shift computation =====================

    #[test]
    fn test_shift_boundary_angles_even_width() {
        assert_eq!(column_shift(360, 0.0), 0);
        assert_eq!(column_shift(360, 90.0), 90);
        assert_eq!(column_shift(360, -90.0), 270);
        assert_eq!(column_shift(360, 180.0), 180);
        assert_eq!(column_shift(360, -180.0), 180);
    }

    #[test]
    fn test_shift_boundary_angles_odd_width() {
        // 5 * 90 / 360 = 1.25
        assert_eq!(column_shift(5, 90.0), 1);
        assert_eq!(column_shift(5, -90.0), 4);
        // 5 * 180 / 360 = 2.5, half away from zero
        assert_eq!(column_shift(5, 180.0), 3);
        assert_eq!(column_shift(5, -180.0), 2);
    }

    #[test]
    fn test_shift_rounds_half_away_from_zero() {
        // 5 * 36 / 360 = 0.5
        assert_eq!(column_shift(5, 36.0), 1);
        assert_eq!(column_shift(5, -36.0), 4);
        // 10 * 54 / 360 = 1.5
        assert_eq!(column_shift(10, 54.0), 2);
        assert_eq!(column_shift(10, -54.0), 8);
    }

    #[test]
    fn test_shift_half_turn_is_half_width() {
        assert_eq!(column_shift(4096, 180.0), 2048);
        assert_eq!(column_shift(1001, 180.0), 501);
    }

    #[test]
    fn test_shift_full_turns_are_identity() {
        assert_eq!(column_shift(360, 360.0), 0);
        assert_eq!(column_shift(360, -360.0), 0);
        assert_eq!(column_shift(1000, 720.0), 0);
    }

    #[test]
    fn test_shift_equivalent_angles() {
        assert_eq!(column_shift(1000, 190.0), column_shift(1000, -170.0));
        assert_eq!(column_shift(1000, 450.0), column_shift(1000, 90.0));
        assert_eq!(column_shift(999, -450.0), column_shift(999, -90.0));
    }

    #[test]
    fn test_shift_width_one() {
        for angle in [0.0, 45.0, 90.0, 180.0, -180.0, 359.0] {
            assert_eq!(column_shift(1, angle), 0);
        }
    }

    #[test]
    fn test_shift_degenerate_inputs() {
        assert_eq!(column_shift(0, 90.0), 0);
        assert_eq!(column_shift(100, f64::NAN), 0);
        assert_eq!(column_shift(100, f64::INFINITY), 0);
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(180.0), 180.0);
        assert_eq!(normalize_angle(-180.0), -180.0);
        assert_eq!(normalize_angle(190.0), -170.0);
        assert_eq!(normalize_angle(-190.0), 170.0);
        assert_eq!(normalize_angle(540.0), 180.0);
        assert_eq!(normalize_angle(-540.0), -180.0);
        assert_eq!(normalize_angle(720.0), 0.0);
    }

    #[test]
    fn test_shift_columns_raw() {
        // 4 pixels, 1 channel, two rows
        let samples = [0, 1, 2, 3, 10, 11, 12, 13];
        assert_eq!(shift_columns(&samples, 4, 1, 1), vec![3, 0, 1, 2, 13, 10, 11, 12]);
        assert_eq!(shift_columns(&samples, 4, 1, 0), samples.to_vec());
        assert_eq!(shift_columns(&samples, 4, 1, 4), samples.to_vec());
    }

    #[test]
    fn test_shift_columns_keeps_pixels_together() {
        // 3 RGB pixels, one row
        let samples = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        assert_eq!(
            shift_columns(&samples, 3, 3, 2),
            vec![4, 5, 6, 7, 8, 9, 1, 2, 3]
        );
    }

    // ===================== Image rotation =====================

    #[test]
    fn test_marker_moves_right_by_quarter_turn() {
        let img = marker_image(360, 180, 0);
        let rotated = rotate_yaw(&img, 90.0).unwrap().to_rgb8();

        for y in [0, 90, 179] {
            assert_eq!(*rotated.get_pixel(90, y), MARKER);
            assert_eq!(*rotated.get_pixel(0, y), Rgb([0, 0, 0]));
        }
    }

    #[test]
    fn test_output_column_zero_is_input_column_270() {
        let src = column_coded(360, 180);
        let rotated = rotate_yaw(&DynamicImage::ImageRgb8(src.clone()), 90.0)
            .unwrap()
            .to_rgb8();

        for y in 0..180 {
            assert_eq!(rotated.get_pixel(0, y), src.get_pixel(270, y));
            assert_eq!(rotated.get_pixel(90, y), src.get_pixel(0, y));
            assert_eq!(rotated.get_pixel(359, y), src.get_pixel(269, y));
        }
    }

    #[test]
    fn test_negative_quarter_turn_moves_left() {
        let img = marker_image(360, 4, 0);
        let rotated = rotate_yaw(&img, -90.0).unwrap().to_rgb8();
        assert_eq!(*rotated.get_pixel(270, 0), MARKER);
    }

    #[test]
    fn test_half_turn_is_not_a_mirror() {
        let src = column_coded(8, 2);
        let rotated = rotate_yaw(&DynamicImage::ImageRgb8(src.clone()), 180.0)
            .unwrap()
            .to_rgb8();

        // Columns keep their left-to-right order.
        for x in 0..8 {
            assert_eq!(rotated.get_pixel(x, 0), src.get_pixel((x + 4) % 8, 0));
        }
        assert_ne!(rotated, image::imageops::flip_horizontal(&src));
    }

    #[test]
    fn test_zero_angle_returns_identical_copy() {
        let img = DynamicImage::ImageRgb8(column_coded(33, 7));
        let rotated = rotate_yaw(&img, 0.0).unwrap();
        assert_eq!(rotated, img);
    }

    #[test]
    fn test_full_turn_equals_zero() {
        let img = DynamicImage::ImageRgb8(column_coded(33, 7));
        assert_eq!(rotate_yaw(&img, 360.0).unwrap(), rotate_yaw(&img, 0.0).unwrap());
    }

    #[test]
    fn test_190_equals_minus_170() {
        let img = DynamicImage::ImageRgb8(column_coded(101, 3));
        assert_eq!(
            rotate_yaw(&img, 190.0).unwrap(),
            rotate_yaw(&img, -170.0).unwrap()
        );
    }

    #[test]
    fn test_half_turn_tie_on_odd_width() {
        let img = DynamicImage::ImageRgb8(column_coded(5, 1));
        let plus = rotate_yaw(&img, 180.0).unwrap();
        let minus = rotate_yaw(&img, -180.0).unwrap();

        assert_ne!(plus, minus);
        assert_eq!(rotate_yaw(&plus, -180.0).unwrap(), img);
    }

    #[test]
    fn test_width_one_unchanged() {
        let img = DynamicImage::ImageRgb8(column_coded(1, 10));
        assert_eq!(rotate_yaw(&img, 123.0).unwrap(), img);
    }

    #[test]
    fn test_grayscale_rotation() {
        let src = GrayImage::from_fn(4, 2, |x, _| Luma([x as u8]));
        let rotated = rotate_yaw(&DynamicImage::ImageLuma8(src), 90.0).unwrap();

        let gray = rotated.as_luma8().unwrap();
        assert_eq!(gray.as_raw(), &vec![3, 0, 1, 2, 3, 0, 1, 2]);
    }

    #[test]
    fn test_rgba_keeps_alpha_with_pixel() {
        let src = RgbaImage::from_fn(4, 1, |x, _| Rgba([x as u8, 0, 0, 10 * x as u8]));
        let rotated = rotate_yaw(&DynamicImage::ImageRgba8(src), -90.0).unwrap();

        let rgba = rotated.as_rgba8().unwrap();
        assert_eq!(*rgba.get_pixel(0, 0), Rgba([1, 0, 0, 10]));
        assert_eq!(*rgba.get_pixel(3, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_sixteen_bit_depth_preserved() {
        let src: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_fn(6, 2, |x, _| Rgb([x as u16 * 10_000, 1, 2]));
        let rotated = rotate_yaw(&DynamicImage::ImageRgb16(src), 60.0).unwrap();

        let rgb16 = rotated.as_rgb16().unwrap();
        assert_eq!(rgb16.get_pixel(1, 0).0, [0, 1, 2]);
        assert_eq!(rgb16.get_pixel(0, 1).0, [50_000, 1, 2]);
    }

    #[test]
    fn test_luma_alpha_rejected() {
        let img = DynamicImage::ImageLumaA8(ImageBuffer::from_pixel(4, 4, LumaA([1, 2])));
        assert!(matches!(
            rotate_yaw(&img, 90.0),
            Err(TransformError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_non_finite_angle_rejected() {
        let img = DynamicImage::ImageRgb8(column_coded(4, 4));
        assert_eq!(
            rotate_yaw(&img, f64::INFINITY),
            Err(TransformError::InvalidAngle(f64::INFINITY))
        );
        assert!(matches!(
            rotate_yaw(&img, f64::NAN),
            Err(TransformError::InvalidAngle(_))
        ));
    }

    // ===================== Property-based tests =====================

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// Random 8-bit image in one of the supported layouts.
        fn image_strategy() -> impl Strategy<Value = DynamicImage> {
            (1u32..=40, 1u32..=6, prop_oneof![Just(1usize), Just(3), Just(4)]).prop_flat_map(
                |(width, height, channels)| {
                    let len = width as usize * height as usize * channels;
                    prop::collection::vec(any::<u8>(), len..=len).prop_map(move |samples| {
                        match channels {
                            1 => DynamicImage::ImageLuma8(
                                GrayImage::from_raw(width, height, samples).unwrap(),
                            ),
                            3 => DynamicImage::ImageRgb8(
                                RgbImage::from_raw(width, height, samples).unwrap(),
                            ),
                            _ => DynamicImage::ImageRgba8(
                                RgbaImage::from_raw(width, height, samples).unwrap(),
                            ),
                        }
                    })
                },
            )
        }

        proptest! {
            /// Property: rotating by a and then by -a restores the image.
            #[test]
            fn prop_inverse_rotation_restores(
                img in image_strategy(),
                angle in -720.0f64..720.0,
            ) {
                let there = rotate_yaw(&img, angle).unwrap();
                let back = rotate_yaw(&there, -angle).unwrap();
                prop_assert_eq!(back, img);
            }

            /// Property: dimensions and layout never change.
            #[test]
            fn prop_dimensions_preserved(
                img in image_strategy(),
                angle in -360.0f64..360.0,
            ) {
                let rotated = rotate_yaw(&img, angle).unwrap();
                prop_assert_eq!(rotated.width(), img.width());
                prop_assert_eq!(rotated.height(), img.height());
                prop_assert_eq!(rotated.color(), img.color());
            }

            /// Property: a and a - 360 agree away from the half-turn tie.
            #[test]
            fn prop_full_turn_periodic(
                img in image_strategy(),
                degrees in -179i32..=179,
            ) {
                let angle = f64::from(degrees);
                prop_assert_eq!(
                    rotate_yaw(&img, angle).unwrap(),
                    rotate_yaw(&img, angle - 360.0).unwrap()
                );
            }

            /// Property: the shift is always a valid column index.
            #[test]
            fn prop_shift_in_range(
                width in 1u32..=100_000,
                angle in -10_000.0f64..10_000.0,
            ) {
                prop_assert!(column_shift(width, angle) < width);
            }

            /// Property: every output column is some input column.
            #[test]
            fn prop_columns_are_permuted(
                width in 1u32..=200,
                angle in -180.0f64..=180.0,
            ) {
                let src = column_coded(width, 1);
                let rotated = rotate_yaw(&DynamicImage::ImageRgb8(src.clone()), angle)
                    .unwrap()
                    .to_rgb8();
                let shift = column_shift(width, angle);
                for x in 0..width {
                    let from = (x + width - shift) % width;
                    prop_assert_eq!(rotated.get_pixel(x, 0), src.get_pixel(from, 0));
                }
            }
        }
    }
}
