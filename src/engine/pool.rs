//! Bounded worker pool: run jobs through the executor, at most `concurrency`
//! in flight at any instant.

use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::engine::executor::JobExecutor;
use crate::engine::progress::{ProgressBar, ProgressTracker, update_progress_bar};
use crate::types::{FeatmillError, Job, JobOutcome, JobResult};

/// Everything a dispatch run shares besides the job list.
pub struct DispatchParams<'a> {
    pub executor: &'a dyn JobExecutor,
    pub tracker: &'a ProgressTracker,
    /// When set, workers stop claiming queued jobs; in-flight jobs finish
    /// (graceful drain, nothing is killed mid-write).
    pub cancel: Option<Arc<AtomicBool>>,
    /// Updated once per completed job (verbose runs).
    pub bar: Option<ProgressBar>,
}

fn cancel_requested(cancel: &Option<Arc<AtomicBool>>) -> bool {
    cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed))
}

/// Worker loop: claim jobs until the queue closes or cancellation is
/// requested. A job's failure becomes its result; it never touches siblings.
fn worker_loop(
    job_rx: Receiver<Job>,
    result_tx: Sender<JobResult>,
    executor: &dyn JobExecutor,
    tracker: &ProgressTracker,
    cancel: &Option<Arc<AtomicBool>>,
) {
    while let Ok(job) = job_rx.recv() {
        if cancel_requested(cancel) {
            break;
        }
        let outcome = match executor.execute(&job.input, &job.output) {
            Ok(()) => JobOutcome::Succeeded,
            Err(err) => JobOutcome::Failed(err),
        };
        let result = JobResult { job, outcome };
        tracker.on_complete(&result);
        if result_tx.send(result).is_err() {
            break;
        }
    }
}

/// Run `jobs` with at most `concurrency` concurrent executions and return one
/// result per executed job, in completion order. Blocks until all claimed
/// jobs have reported. A cancelled run returns fewer results (unclaimed jobs
/// are dropped); in-flight jobs always finish.
pub fn dispatch_jobs(
    jobs: Vec<Job>,
    concurrency: usize,
    params: DispatchParams<'_>,
) -> Result<Vec<JobResult>, FeatmillError> {
    if concurrency == 0 {
        return Err(FeatmillError::Config(
            "concurrency must be at least 1".to_string(),
        ));
    }
    if jobs.is_empty() {
        return Ok(Vec::new());
    }
    let workers = concurrency.min(jobs.len());

    // Cap = job count so the fill below never blocks; dropping the sender
    // closes the queue, which is what ends the workers.
    let (job_tx, job_rx) = bounded::<Job>(jobs.len());
    let (result_tx, result_rx) = bounded::<JobResult>(jobs.len());
    for job in jobs {
        if job_tx.send(job).is_err() {
            break;
        }
    }
    drop(job_tx);

    let mut results = Vec::new();
    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let cancel = params.cancel.clone();
            let executor = params.executor;
            let tracker = params.tracker;
            scope.spawn(move || worker_loop(job_rx, result_tx, executor, tracker, &cancel));
        }
        // Drop the last local sender so the recv loop ends when workers exit.
        drop(result_tx);
        while let Ok(result) = result_rx.recv() {
            if let Some(bar) = &params.bar {
                update_progress_bar(bar, 1);
            }
            results.push(result);
        }
    });
    debug!("pool drained: {} results from {} workers", results.len(), workers);
    Ok(results)
}
