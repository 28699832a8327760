//! Yaw rotation of equirectangular panoramas.
//!
//! In an equirectangular image the horizontal axis maps linearly to yaw, so
//! turning the virtual camera is a cyclic shift of pixel columns. Nothing is
//! resampled: height, channel layout and bit depth are untouched.
//!
//! # Conventions
//!
//! - Angles are in degrees, positive = content moves right (clockwise when
//!   viewed from above)
//! - Output column `x` takes input column `(x - shift) mod width`
//! - `shift = round(width * a / 360)` where `a` is the angle reduced into
//!   [-180, 180] with its sign kept, rounding half away from zero

mod yaw;

pub use yaw::{column_shift, normalize_angle, rotate_yaw, shift_columns, TransformError};
