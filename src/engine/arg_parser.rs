use clap::Parser;
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const AUDIO_DIR: &'static str = ".";
}

/// Batch audio feature extraction with a bounded worker pool.
#[derive(Clone, Parser)]
#[command(name = "featmill")]
#[command(about = "Extract one feature artifact per audio file; reruns skip finished outputs.")]
pub struct Cli {
    /// Audio root to scan. Default: current directory.
    #[arg(value_name = "AUDIO_DIR", default_value = DefaultArgs::AUDIO_DIR)]
    pub audio_dir: PathBuf,

    /// Output root for feature artifacts. Default: `features`.
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Glob pattern for candidate files, relative to AUDIO_DIR. Default: `**/*.mp3`.
    #[arg(long, short)]
    pub pattern: Option<String>,

    /// Artifact file extension (replaces the media extension). Default: `mmap`.
    #[arg(long)]
    pub artifact_ext: Option<String>,

    /// Max concurrent extractions. Default: twice the available parallelism.
    #[arg(long, short)]
    pub jobs: Option<usize>,

    /// Extractor program, invoked as `<program> [extractor args] <input> <tmp-output>`.
    #[arg(long, short = 'x')]
    pub extractor: Option<PathBuf>,

    /// Extra argument passed to the extractor before the input path. Repeatable.
    #[arg(long = "extractor-arg", value_name = "ARG")]
    pub extractor_args: Vec<String>,

    /// Recompute artifacts even when the output already exists.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub force: Option<bool>,

    /// Verbose output (progress bars, debug logging).
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Download archive parts into the download dir before extracting.
    #[arg(long)]
    pub fetch: bool,

    /// Concatenate downloaded parts and unpack the archive into AUDIO_DIR.
    #[arg(long)]
    pub unpack: bool,

    /// Base URL for numbered archive parts (with --fetch).
    #[arg(long)]
    pub url_base: Option<String>,

    /// Number of archive parts to fetch (with --fetch).
    #[arg(long)]
    pub parts: Option<u32>,

    /// Directory for downloaded archive parts.
    #[arg(long)]
    pub download_dir: Option<PathBuf>,
}
