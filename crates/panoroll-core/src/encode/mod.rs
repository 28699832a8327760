//! Image encoding for panoroll.
//!
//! This module turns a transformed pixel buffer back into file bytes in the
//! container the source was read from:
//! - JPEG with configurable quality (default 95)
//! - PNG with configurable compression and adaptive filtering
//! - BMP, TIFF and WebP with the codec defaults
//!
//! Encoding is pure: it returns bytes and never touches the filesystem.
//!
//! # Examples
//!
//! ```ignore
//! use panoroll_core::encode::{encode, EncodeOptions};
//!
//! let bytes = encode(&rotated, pano.format, &EncodeOptions::default())?;
//! std::fs::write(out, bytes)?;
//! ```

mod container;

pub use container::{encode, EncodeError, EncodeOptions, PngCompression, DEFAULT_JPEG_QUALITY};
