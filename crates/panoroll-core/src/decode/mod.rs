//! Image decoding for panoroll.
//!
//! This module provides functionality for:
//! - Decoding JPEG, PNG, BMP, TIFF and WebP files into a [`Panorama`]
//! - Filtering candidate paths by supported extension
//! - Probing dimensions and container without decoding pixel data
//!
//! Decoding keeps the source's native bit depth and channel layout. The
//! detected container travels with the pixels so the encoder can write the
//! result back in the same format.
//!
//! # Examples
//!
//! ```ignore
//! use panoroll_core::decode::decode_file;
//!
//! let pano = decode_file(Path::new("room.jpg"))?;
//! println!("Decoded {}x{} {}", pano.width(), pano.height(), pano.format.name());
//! ```

mod file;
mod types;

pub use file::{decode_bytes, decode_file, is_supported_path, probe, SUPPORTED_EXTENSIONS};
pub use types::{ChannelLayout, DecodeError, ImageInfo, Panorama, SourceFormat};
