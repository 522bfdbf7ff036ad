//! Public types for the featmill API and pipeline.

use std::path::PathBuf;
use thiserror::Error;

use crate::utils::config::{ExtractDefaults, FetchConsts, default_jobs};

/// Error kinds surfaced by featmill. Startup kinds ([`NotFound`](Self::NotFound),
/// [`Config`](Self::Config)) abort a run before any work; the per-job kinds
/// ([`Io`](Self::Io), [`Extractor`](Self::Extractor)) are caught at the job
/// boundary and recorded in the run summary.
#[derive(Debug, Error)]
pub enum FeatmillError {
    #[error("input directory not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("extractor failed on {input}: {reason}")]
    Extractor { input: PathBuf, reason: String },
}

/// One unit of dispatched work: an input audio file and the artifact it
/// produces. Consumed exactly once by the pool; results live on disk.
#[derive(Clone, Debug)]
pub struct Job {
    /// Absolute path to the source audio file.
    pub input: PathBuf,
    /// Deterministic artifact path derived from `input` (root-relative path
    /// under the output root, media extension replaced).
    pub output: PathBuf,
}

/// Terminal state of one job.
#[derive(Debug)]
pub enum JobOutcome {
    Succeeded,
    Failed(FeatmillError),
}

/// Exactly one of these is produced per executed job.
#[derive(Debug)]
pub struct JobResult {
    pub job: Job,
    pub outcome: JobOutcome,
}

impl JobResult {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, JobOutcome::Failed(_))
    }
}

/// Output of the work filter: jobs that need work, plus accounting for
/// candidates that were skipped or could not be prepared.
#[derive(Debug, Default)]
pub struct JobPlan {
    pub jobs: Vec<Job>,
    /// Candidates whose artifact already existed (idempotence policy).
    pub skipped: usize,
    /// Candidates whose artifact directory could not be created; pre-failed
    /// results, never dispatched.
    pub failed: Vec<JobResult>,
}

/// End-of-run accounting. Produced even when jobs failed; the failed input
/// list is what a rerun retries (finished artifacts are skipped).
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Discovered candidate files, before filtering.
    pub candidates: usize,
    /// Candidates skipped because their artifact already existed.
    pub skipped: usize,
    pub succeeded: usize,
    /// Input paths of failed jobs.
    pub failed: Vec<PathBuf>,
    /// True when a stop signal interrupted the run; queued jobs were not
    /// claimed, in-flight jobs were allowed to finish.
    pub cancelled: bool,
}

/// Full options (CLI and lib). Construct once per run; read-only thereafter.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Output root for feature artifacts.
    pub out_dir: PathBuf,
    /// Glob pattern for candidate files, relative to the audio root.
    pub pattern: String,
    /// Extension of produced artifacts (replaces the media extension).
    pub artifact_ext: String,
    /// Max concurrent extractions. Must be at least 1.
    pub jobs: usize,
    /// Recompute artifacts even when the output already exists.
    pub force: bool,
    /// Show progress bars and debug logging.
    pub verbose: bool,
    /// Extractor program (CLI path). Lib callers pass an executor instead.
    pub extractor: Option<PathBuf>,
    /// Extra arguments handed to the extractor before the input path.
    pub extractor_args: Vec<String>,
    /// Base URL for numbered archive parts (fetch stage).
    pub url_base: String,
    /// Number of archive parts on the mirror (fetch stage).
    pub parts: u32,
    /// Directory for downloaded archive parts.
    pub download_dir: PathBuf,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(ExtractDefaults::OUT_DIR),
            pattern: ExtractDefaults::PATTERN.to_string(),
            artifact_ext: ExtractDefaults::ARTIFACT_EXT.to_string(),
            jobs: default_jobs(),
            force: false,
            verbose: false,
            extractor: None,
            extractor_args: Vec::new(),
            url_base: FetchConsts::URL_BASE.to_string(),
            parts: FetchConsts::NUM_PARTS,
            download_dir: PathBuf::from(FetchConsts::DOWNLOAD_DIR),
        }
    }
}
