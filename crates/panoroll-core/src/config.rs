//! Batch settings.
//!
//! `BatchConfig` is plain serde data so front ends can layer it from files,
//! environment and flags. Missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::batch::{default_worker_count, CollisionPolicy};
use crate::encode::{EncodeOptions, PngCompression, DEFAULT_JPEG_QUALITY};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("workers must be at least 1")]
    ZeroWorkers,

    #[error("jpeg_quality must be between 1 and 100, got {0}")]
    JpegQuality(u8),
}

/// Settings shared by every job of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads; `None` means one per hardware thread.
    pub workers: Option<usize>,
    /// What to do when an output file already exists.
    pub collision: CollisionPolicy,
    /// JPEG re-encode quality (1-100).
    pub jpeg_quality: u8,
    /// PNG compression effort.
    pub png_compression: PngCompression,
    /// Descend into subdirectories when a directory is given as input.
    pub recursive: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: None,
            collision: CollisionPolicy::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            png_compression: PngCompression::default(),
            recursive: false,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::JpegQuality(self.jpeg_quality));
        }
        Ok(())
    }

    /// Effective worker count.
    pub fn worker_count(&self) -> usize {
        self.workers
            .filter(|&n| n > 0)
            .unwrap_or_else(default_worker_count)
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            jpeg_quality: self.jpeg_quality,
            png_compression: self.png_compression,
        }
    }
}
