//! Application configuration constants.
//! Defaults and tuning in one place.

use std::sync::OnceLock;
use std::thread;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived filenames: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    failed_list_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache paths from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                failed_list_filename: format!("{pkg}.failed"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    pub fn failed_list_filename(&self) -> &str {
        &self.failed_list_filename
    }
}

// ---- Extraction defaults ----

pub struct ExtractDefaults;

impl ExtractDefaults {
    /// Candidate pattern relative to the audio root.
    pub const PATTERN: &'static str = "**/*.mp3";
    /// Extension of produced feature artifacts.
    pub const ARTIFACT_EXT: &'static str = "mmap";
    /// Output root when none is configured.
    pub const OUT_DIR: &'static str = "features";
    /// Worker count = available parallelism × this. Extractors are mostly
    /// CPU-bound but block on audio I/O, so oversubscribe a little.
    pub const JOBS_PER_CPU: usize = 2;
}

/// Suffix for in-progress files (artifacts and downloads); renamed into
/// place on success.
pub const TMP_SUFFIX: &str = ".part";

/// Default worker count: `JOBS_PER_CPU` × available parallelism, floor 1.
pub fn default_jobs() -> usize {
    let cpus = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    (cpus * ExtractDefaults::JOBS_PER_CPU).max(1)
}

// ---- Fetch ----

/// Download and archive-part tuning.
pub struct FetchConsts;

impl FetchConsts {
    /// MagnaTagATune mirror; the zero-padded part number is appended.
    pub const URL_BASE: &'static str = "https://mirg.city.ac.uk/datasets/magnatagatune/mp3.zip.";
    /// Part filename prefix on disk.
    pub const PART_PREFIX: &'static str = "mp3.zip.";
    /// Number of archive parts on the mirror.
    pub const NUM_PARTS: u32 = 3;
    /// Download dir when none is configured.
    pub const DOWNLOAD_DIR: &'static str = "download";
    /// Streaming read chunk (bytes). 64 KB.
    pub const CHUNK_SIZE: usize = 64 * 1024;
    /// Attempts per part before giving up on transient failures.
    pub const MAX_ATTEMPTS: u32 = 3;
    /// Backoff between attempts, multiplied by the attempt number (seconds).
    pub const RETRY_BACKOFF_SECS: u64 = 2;
    pub const CONNECT_TIMEOUT_SECS: u64 = 30;
}

// ---- Failure reporting ----

/// When more inputs than this fail, write the list to the failed-list file
/// instead of the log.
pub const FAILED_LIST_THRESHOLD: usize = 100;
