//! Per-job errors, precondition errors and the aggregate batch result.

use std::path::PathBuf;

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::transform::TransformError;

/// Why a single job failed. Never aborts sibling jobs.
#[derive(Debug, Error)]
pub enum JobError {
    /// The source file could not be read.
    #[error("cannot read source: {0}")]
    ReadFailure(String),

    /// The source could not be decoded.
    #[error("corrupt image: {0}")]
    CorruptImage(String),

    /// Container or channel layout outside the supported set.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// NaN or infinite angle.
    #[error("invalid rotation angle: {0}")]
    InvalidAngle(f64),

    /// The codec could not produce output bytes.
    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    /// The output could not be written (permissions, disk full, ...).
    #[error("cannot write {}: {reason}", path.display())]
    WriteFailure { path: PathBuf, reason: String },

    /// `CollisionPolicy::Fail` and the output already exists.
    #[error("output already exists: {}", .0.display())]
    OutputExists(PathBuf),
}

impl From<DecodeError> for JobError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Io(reason) => JobError::ReadFailure(reason),
            DecodeError::CorruptImage(reason) => JobError::CorruptImage(reason),
            DecodeError::UnsupportedFormat(reason) | DecodeError::UnsupportedExtension(reason) => {
                JobError::UnsupportedFormat(reason)
            }
        }
    }
}

impl From<TransformError> for JobError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::UnsupportedFormat(reason) => JobError::UnsupportedFormat(reason),
            TransformError::InvalidAngle(angle) => JobError::InvalidAngle(angle),
        }
    }
}

impl From<EncodeError> for JobError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::UnsupportedFormat { .. } => JobError::UnsupportedFormat(err.to_string()),
            EncodeError::InvalidDimensions { .. } | EncodeError::EncodingFailed { .. } => {
                JobError::EncodingFailed(err.to_string())
            }
        }
    }
}

/// Problems detected before any worker starts.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no input files")]
    NoInputs,

    #[error("invalid rotation angle for {}: {angle}", path.display())]
    InvalidAngle { path: PathBuf, angle: f64 },

    #[error("input has no file name: {}", .0.display())]
    MissingFileName(PathBuf),

    #[error("several inputs would be written to {}", .0.display())]
    DuplicateOutputName(PathBuf),

    #[error("output directory {} is not writable: {reason}", path.display())]
    OutputDirUnwritable { path: PathBuf, reason: String },

    #[error("failed to start worker pool: {0}")]
    ThreadPool(String),
}

/// A failed job and the reason.
#[derive(Debug)]
pub struct JobFailure {
    pub source: PathBuf,
    pub error: JobError,
}

impl JobFailure {
    /// One-line description for reports.
    pub fn message(&self) -> String {
        format!("{}: {}", self.source.display(), self.error)
    }
}

/// Aggregate outcome of a batch. Every job lands in exactly one list.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Output paths of successful jobs, in job order.
    pub outputs: Vec<PathBuf>,
    /// Failed jobs, in job order.
    pub failures: Vec<JobFailure>,
    /// Sources of jobs skipped after cancellation.
    pub cancelled: Vec<PathBuf>,
}

impl BatchResult {
    pub fn succeeded(&self) -> usize {
        self.outputs.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.outputs.len() + self.failures.len() + self.cancelled.len()
    }

    /// True when every job succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.cancelled.is_empty()
    }

    pub fn failure_messages(&self) -> Vec<String> {
        self.failures.iter().map(JobFailure::message).collect()
    }
}
