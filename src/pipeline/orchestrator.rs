//! Main orchestrator: discover → filter → dispatch → summarize.

use anyhow::Result;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::discover::{compile_pattern, discover};
use crate::engine::executor::JobExecutor;
use crate::engine::filter::plan_jobs;
use crate::engine::pool::{DispatchParams, dispatch_jobs};
use crate::engine::progress::{ProgressTracker, create_progress_bar};
use crate::engine::tools::ensure_dir;
use crate::types::{FeatmillError, JobOutcome, Opts, RunSummary};

/// End-to-end run over the audio tree at `root`. Not transactional:
/// artifacts finished before a failure or cancellation stay on disk, and a
/// rerun with `force = false` skips them and retries only the remainder.
pub fn run(
    root: &Path,
    opts: &Opts,
    executor: &dyn JobExecutor,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<RunSummary> {
    if opts.jobs == 0 {
        return Err(FeatmillError::Config("jobs must be at least 1".to_string()).into());
    }
    // Reject a malformed pattern before touching the filesystem.
    compile_pattern(&opts.pattern)?;
    let root = root
        .canonicalize()
        .map_err(|_| FeatmillError::NotFound(root.to_path_buf()))?;
    ensure_dir(&opts.out_dir)?;

    let candidates = discover(&root, &opts.pattern)?;
    let plan = plan_jobs(&candidates, &root, opts);
    info!(
        "{} candidates, {} already done, {} to extract",
        candidates.len(),
        plan.skipped,
        plan.jobs.len()
    );

    let tracker = ProgressTracker::default();
    tracker.on_start(plan.jobs.len());
    let bar = (opts.verbose && !plan.jobs.is_empty())
        .then(|| create_progress_bar(plan.jobs.len(), "Extracting"));

    let results = dispatch_jobs(
        plan.jobs,
        opts.jobs,
        DispatchParams {
            executor,
            tracker: &tracker,
            cancel: cancel.clone(),
            bar,
        },
    )?;

    let mut summary = RunSummary {
        candidates: candidates.len(),
        skipped: plan.skipped,
        cancelled: cancel.is_some_and(|c| c.load(Ordering::Relaxed)),
        ..RunSummary::default()
    };
    for result in plan.failed.iter().chain(results.iter()) {
        match &result.outcome {
            JobOutcome::Succeeded => summary.succeeded += 1,
            JobOutcome::Failed(err) => {
                debug!("job failed: {err}");
                summary.failed.push(result.job.input.clone());
            }
        }
    }
    let (completed, failed, total) = tracker.snapshot();
    debug!("tracker: {completed} completed, {failed} failed of {total}");
    Ok(summary)
}
