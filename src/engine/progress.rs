//! Progress tracking: shared run counters plus kdam bar helpers.

use kdam::{Animation, Bar, BarExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::types::{JobOutcome, JobResult};

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Aggregate run counters. Created by the orchestrator, updated from worker
/// threads on job completion. Purely observational: never consulted for
/// dispatch decisions.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    total: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl ProgressTracker {
    pub fn on_start(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
    }

    /// Record one finished job. Safe from any number of workers concurrently;
    /// counters only grow.
    pub fn on_complete(&self, result: &JobResult) {
        match result.outcome {
            JobOutcome::Succeeded => self.completed.fetch_add(1, Ordering::Relaxed),
            JobOutcome::Failed(_) => self.failed.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Best-effort `(completed, failed, total)` at this instant. Across
    /// successive calls `completed + failed` never decreases.
    pub fn snapshot(&self) -> (usize, usize, usize) {
        (
            self.completed.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }
}

/// Create a percentage bar for a known total.
pub fn create_progress_bar(total: usize, desc: &str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = total,
        desc = desc,
        animation = Animation::Classic
    )))
}

/// Byte-scaled bar for downloads (total from Content-Length; 0 when unknown).
pub fn create_byte_bar(total: usize, desc: &str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = total,
        desc = desc,
        animation = Animation::Classic,
        unit = " B",
        unit_scale = true
    )))
}

/// Update progress bar if available
/// Uses try_lock to avoid blocking if mutex is contended (non-blocking)
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    // If the lock is contended, skip the update; the bar catches up next time.
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Force a refresh of the bar (e.g. so the counter shows immediately).
pub fn refresh_bar(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.refresh();
    }
}
