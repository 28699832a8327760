//! Panoroll Core - yaw rotation for equirectangular panoramas
//!
//! This crate provides decoding, the column-shift transform, encoding back
//! to the source container, and a parallel batch runner that applies one
//! rotation to many files.

pub mod batch;
pub mod config;
pub mod decode;
pub mod encode;
pub mod preview;
pub mod transform;

pub use batch::{BatchError, BatchInputs, BatchResult, BatchRunner, CollisionPolicy, Job};
pub use config::BatchConfig;
pub use decode::{decode_file, Panorama, SourceFormat};
pub use encode::{encode, EncodeOptions};
pub use preview::{preview_file, Preview};
pub use transform::{column_shift, rotate_yaw};
