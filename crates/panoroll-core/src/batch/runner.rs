//! Parallel batch execution.
//!
//! The runner validates the whole batch up front (inputs present, angles
//! finite, output names unique, destinations writable), then hands the jobs
//! to a dedicated rayon pool. Each job is decoded, rotated, encoded and
//! written on one worker; a failing job is recorded and the rest carry on.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tempfile::NamedTempFile;
use tracing::{debug, info, info_span, warn};

use super::job::Job;
use super::naming::{output_path, CollisionPolicy};
use super::progress::{BatchProgress, CancelToken, JobState, ProgressSink};
use super::result::{BatchError, BatchResult, JobError, JobFailure};
use crate::config::BatchConfig;
use crate::decode::decode_file;
use crate::encode::{encode, EncodeOptions};
use crate::transform::rotate_yaw;

/// Number of hardware threads, or 1 if it cannot be determined.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// A job with its output path resolved.
struct PlannedJob<'a> {
    job: &'a Job,
    output: PathBuf,
}

enum Outcome {
    Succeeded(PathBuf),
    Failed(JobError),
    Cancelled,
}

impl Outcome {
    fn state(&self) -> JobState {
        match self {
            Outcome::Succeeded(_) => JobState::Succeeded,
            Outcome::Failed(_) => JobState::Failed,
            Outcome::Cancelled => JobState::Cancelled,
        }
    }
}

/// Applies the yaw rotation to a list of jobs on a fixed-size worker pool.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    workers: usize,
    collision: CollisionPolicy,
    encode: EncodeOptions,
    cancel: Option<CancelToken>,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(default_worker_count())
    }
}

impl BatchRunner {
    /// Runner with `workers` threads (at least one) and default settings.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            collision: CollisionPolicy::default(),
            encode: EncodeOptions::default(),
            cancel: None,
        }
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(config.worker_count())
            .with_collision(config.collision)
            .with_encode_options(config.encode_options())
    }

    pub fn with_collision(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }

    pub fn with_encode_options(mut self, options: EncodeOptions) -> Self {
        self.encode = options;
        self
    }

    /// Stop starting new jobs once `token` is cancelled.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn collision(&self) -> CollisionPolicy {
        self.collision
    }

    /// Run every job and return once all of them reached a terminal state.
    ///
    /// `progress` is called once per job, serialized, with a strictly
    /// increasing completed count.
    ///
    /// # Errors
    ///
    /// Only precondition failures are returned as errors; per-job failures
    /// are collected in the [`BatchResult`].
    pub fn run<P>(&self, jobs: &[Job], progress: &P) -> Result<BatchResult, BatchError>
    where
        P: ProgressSink + ?Sized,
    {
        let planned = self.plan(jobs)?;
        prepare_destinations(&planned)?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|index| format!("panoroll-worker-{index}"))
            .build()
            .map_err(|e| BatchError::ThreadPool(e.to_string()))?;

        let span = info_span!("batch", jobs = planned.len(), workers = self.workers);
        span.in_scope(|| info!(collision = ?self.collision, "starting batch"));

        let started = Instant::now();
        let total = planned.len();
        let completed = Mutex::new(0usize);

        let outcomes: Vec<Outcome> = pool.install(|| {
            planned
                .par_iter()
                .with_max_len(1)
                .map(|task| {
                    let outcome = span.in_scope(|| self.execute(task));
                    report(&completed, total, &task.job.source, outcome.state(), progress);
                    outcome
                })
                .collect()
        });

        let mut result = BatchResult::default();
        for (task, outcome) in planned.iter().zip(outcomes) {
            match outcome {
                Outcome::Succeeded(output) => result.outputs.push(output),
                Outcome::Failed(error) => result.failures.push(JobFailure {
                    source: task.job.source.clone(),
                    error,
                }),
                Outcome::Cancelled => result.cancelled.push(task.job.source.clone()),
            }
        }

        span.in_scope(|| {
            info!(
                succeeded = result.succeeded(),
                failed = result.failed(),
                cancelled = result.cancelled.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "batch finished"
            )
        });

        Ok(result)
    }

    fn plan<'a>(&self, jobs: &'a [Job]) -> Result<Vec<PlannedJob<'a>>, BatchError> {
        if jobs.is_empty() {
            return Err(BatchError::NoInputs);
        }

        let mut seen = HashSet::with_capacity(jobs.len());
        jobs.iter()
            .map(|job| {
                if !job.angle_degrees.is_finite() {
                    return Err(BatchError::InvalidAngle {
                        path: job.source.clone(),
                        angle: job.angle_degrees,
                    });
                }
                let output = output_path(
                    &job.source,
                    job.angle_degrees,
                    &job.destination_dir,
                    self.collision,
                )
                .ok_or_else(|| BatchError::MissingFileName(job.source.clone()))?;

                if !seen.insert(output.clone()) {
                    return Err(BatchError::DuplicateOutputName(output));
                }
                Ok(PlannedJob { job, output })
            })
            .collect()
    }

    fn execute(&self, task: &PlannedJob<'_>) -> Outcome {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            debug!(source = %task.job.source.display(), "skipped after cancellation");
            return Outcome::Cancelled;
        }

        let started = Instant::now();
        match process_job(task.job, &task.output, self.collision, &self.encode) {
            Ok(()) => {
                debug!(
                    source = %task.job.source.display(),
                    output = %task.output.display(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "rotated"
                );
                Outcome::Succeeded(task.output.clone())
            }
            Err(error) => {
                warn!(source = %task.job.source.display(), %error, "job failed");
                Outcome::Failed(error)
            }
        }
    }
}

/// Decode, rotate, encode and write a single job.
fn process_job(
    job: &Job,
    output: &Path,
    collision: CollisionPolicy,
    options: &EncodeOptions,
) -> Result<(), JobError> {
    // Checked early to skip the decode; the no-clobber persist in
    // write_atomically is the authoritative check.
    if collision == CollisionPolicy::Fail && output.exists() {
        return Err(JobError::OutputExists(output.to_path_buf()));
    }

    let panorama = decode_file(&job.source)?;
    let rotated = rotate_yaw(&panorama.image, job.angle_degrees)?;
    let bytes = encode(&rotated, panorama.format, options)?;
    write_output(output, &bytes, collision)
}

fn write_output(path: &Path, bytes: &[u8], collision: CollisionPolicy) -> Result<(), JobError> {
    write_atomically(path, collision, |file| file.write_all(bytes))
}

/// Write through a temp file in the destination directory and move it into
/// place only once `fill` succeeded, so a failed write never leaves a
/// partial file under `path` or clobbers an existing one.
fn write_atomically<F>(path: &Path, collision: CollisionPolicy, fill: F) -> Result<(), JobError>
where
    F: FnOnce(&mut NamedTempFile) -> io::Result<()>,
{
    let write_failure = |err: io::Error| JobError::WriteFailure {
        path: path.to_path_buf(),
        reason: err.to_string(),
    };

    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::Builder::new()
        .prefix(".panoroll-")
        .tempfile_in(dir)
        .map_err(write_failure)?;
    fill(&mut file).map_err(write_failure)?;
    file.flush().map_err(write_failure)?;

    let persisted = if collision == CollisionPolicy::Fail {
        file.persist_noclobber(path)
    } else {
        file.persist(path)
    };
    persisted.map(drop).map_err(|err| {
        if err.error.kind() == ErrorKind::AlreadyExists {
            JobError::OutputExists(path.to_path_buf())
        } else {
            write_failure(err.error)
        }
    })
}

/// Create every destination directory and check that it accepts new files.
fn prepare_destinations(jobs: &[PlannedJob<'_>]) -> Result<(), BatchError> {
    let dirs: BTreeSet<&Path> = jobs
        .iter()
        .map(|task| task.job.destination_dir.as_path())
        .collect();

    for dir in dirs {
        let unwritable = |reason: String| BatchError::OutputDirUnwritable {
            path: dir.to_path_buf(),
            reason,
        };
        fs::create_dir_all(dir).map_err(|e| unwritable(e.to_string()))?;
        // Dropped immediately, which removes the probe file again.
        tempfile::Builder::new()
            .prefix(".panoroll-probe")
            .tempfile_in(dir)
            .map_err(|e| unwritable(e.to_string()))?;
    }
    Ok(())
}

fn report<P>(completed: &Mutex<usize>, total: usize, source: &Path, state: JobState, sink: &P)
where
    P: ProgressSink + ?Sized,
{
    // Holding the lock while calling out keeps updates ordered.
    let mut count = completed.lock().unwrap_or_else(PoisonError::into_inner);
    *count += 1;
    sink.on_progress(BatchProgress {
        completed: *count,
        total,
        source: source.to_path_buf(),
        state,
    });
}
