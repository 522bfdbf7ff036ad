//! Featmill: batch feature extraction for audio datasets. Discovers audio
//! files under a root, skips files whose artifact already exists, and fans
//! the remaining work out across a bounded worker pool that invokes an
//! external per-file extractor.

pub mod engine;
pub mod fetch;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Result alias used by public featmill API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: extract one feature artifact per audio file under
/// `root` matching `opts.pattern`, through `executor`, at most `opts.jobs`
/// at a time.
///
/// Re-running after a partial run is the recovery mechanism: finished
/// artifacts are skipped (unless `opts.force`) and only the remainder is
/// dispatched. Pass a shared flag as `cancel` to get graceful drain on an
/// external stop signal; the CLI wires this to Ctrl+C, lib callers may pass
/// `None`.
pub fn extract_dir(
    root: &Path,
    opts: &Opts,
    executor: &dyn engine::JobExecutor,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<RunSummary> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    pipeline::orchestrator::run(root, opts, executor, cancel)
}
