//! Work filter: map inputs to artifact paths and decide what needs work.

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::tools::path_relative_to;
use crate::types::{FeatmillError, Job, JobOutcome, JobPlan, JobResult, Opts};

/// Artifact path for `input`: same root-relative path rooted under
/// `out_root`, media extension replaced with `ext`. Pure; within one run all
/// inputs share the media extension, so distinct inputs map to distinct
/// outputs.
pub fn artifact_path_for(input: &Path, audio_root: &Path, out_root: &Path, ext: &str) -> PathBuf {
    let rel = path_relative_to(input, audio_root).unwrap_or_else(|| input.to_path_buf());
    out_root.join(rel).with_extension(ext)
}

/// Apply the idempotence policy to `candidates`: an existing artifact means
/// skip unless `opts.force`. Each surviving job gets its artifact directory
/// created here; a failure there fails that job only (pre-failed result,
/// never dispatched).
pub fn plan_jobs(candidates: &[PathBuf], audio_root: &Path, opts: &Opts) -> JobPlan {
    let mut plan = JobPlan::default();
    for input in candidates {
        let output = artifact_path_for(input, audio_root, &opts.out_dir, &opts.artifact_ext);
        if !opts.force && output.exists() {
            plan.skipped += 1;
            continue;
        }
        let job = Job {
            input: input.clone(),
            output: output.clone(),
        };
        if let Some(parent) = output.parent()
            && let Err(source) = fs::create_dir_all(parent)
        {
            plan.failed.push(JobResult {
                job,
                outcome: JobOutcome::Failed(FeatmillError::Io {
                    path: parent.to_path_buf(),
                    source,
                }),
            });
            continue;
        }
        plan.jobs.push(job);
    }
    debug!(
        "planned {} jobs ({} skipped, {} could not be prepared)",
        plan.jobs.len(),
        plan.skipped,
        plan.failed.len()
    );
    plan
}
