//! Batch rotation of many panoramas.
//!
//! # Flow
//!
//! 1. Collect input files into [`BatchInputs`] (extension filter, de-dup)
//! 2. Turn them into [`Job`]s sharing one angle and one output directory
//! 3. [`BatchRunner::run`] checks preconditions, then spreads the jobs over
//!    a worker pool, reporting each finished job to a [`ProgressSink`]
//! 4. The returned [`BatchResult`] lists every job as succeeded, failed or
//!    cancelled
//!
//! A job is never split across workers, and a failing job never stops its
//! siblings.

mod job;
mod naming;
mod progress;
mod result;
mod runner;

pub use job::{BatchInputs, Job, Rejection};
pub use naming::{output_file_name, output_path, CollisionPolicy};
pub use progress::{BatchProgress, CancelToken, JobState, NoProgress, ProgressSink};
pub use result::{BatchError, BatchResult, JobError, JobFailure};
pub use runner::{default_worker_count, BatchRunner};
