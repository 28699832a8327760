//! Progress reporting and cooperative cancellation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Terminal state of a single job, as seen by a progress sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Succeeded,
    Failed,
    Cancelled,
}

/// Emitted once per job after it reaches a terminal state.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Jobs finished so far, including this one. Strictly increasing.
    pub completed: usize,
    /// Jobs in the batch.
    pub total: usize,
    /// Source path of the job that just finished.
    pub source: PathBuf,
    pub state: JobState,
}

impl BatchProgress {
    /// Fraction of the batch done, in [0, 1].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}

/// Receives progress updates from a running batch.
///
/// Calls come from worker threads but are serialized, so an implementation
/// sees `completed` counting up by one each time.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, progress: BatchProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(BatchProgress) + Send + Sync,
{
    fn on_progress(&self, progress: BatchProgress) {
        self(progress)
    }
}

/// Sink that drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _progress: BatchProgress) {}
}

/// Shared flag asking a running batch to stop starting new jobs.
///
/// Jobs already in flight finish normally; the rest are reported as
/// cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
