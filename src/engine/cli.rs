//! CLI command handler: optional fetch/unpack stages, then the extraction run.

use anyhow::{Context, Result, bail};
use log::{info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::arg_parser::Cli;
use crate::engine::executor::CommandExecutor;
use crate::fetch;
use crate::types::{Opts, RunSummary};
use crate::utils::config::{FAILED_LIST_THRESHOLD, PackagePaths};
use crate::utils::featmill_toml::{apply_file_to_opts, load_featmill_toml};
use crate::utils::{Colors, setup_logging};

/// Build Opts: defaults, then `.featmill.toml` in the working directory, then
/// explicit CLI flags.
fn setup_opts(cli: &Cli) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = load_featmill_toml(std::path::Path::new(".")) {
        apply_file_to_opts(&file, &mut opts);
    }
    if let Some(ref out) = cli.out {
        opts.out_dir = out.clone();
    }
    if let Some(ref pattern) = cli.pattern {
        opts.pattern = pattern.clone();
    }
    if let Some(ref ext) = cli.artifact_ext {
        opts.artifact_ext = ext.clone();
    }
    if let Some(jobs) = cli.jobs {
        opts.jobs = jobs;
    }
    if let Some(force) = cli.force {
        opts.force = force;
    }
    if let Some(verbose) = cli.verbose {
        opts.verbose = verbose;
    }
    if let Some(ref extractor) = cli.extractor {
        opts.extractor = Some(extractor.clone());
    }
    if !cli.extractor_args.is_empty() {
        opts.extractor_args = cli.extractor_args.clone();
    }
    if let Some(ref url_base) = cli.url_base {
        opts.url_base = url_base.clone();
    }
    if let Some(parts) = cli.parts {
        opts.parts = parts;
    }
    if let Some(ref dir) = cli.download_dir {
        opts.download_dir = dir.clone();
    }
    opts
}

/// Run the requested stages. Exit is non-zero when any job failed or the run
/// was cancelled; finished artifacts are kept either way so a rerun only
/// retries the remainder.
pub fn handle_run(cli: &Cli) -> Result<()> {
    setup_logging(cli.verbose.unwrap_or(false));
    let opts = setup_opts(cli);

    if cli.fetch {
        fetch::download_parts(&opts.url_base, opts.parts, &opts.download_dir, opts.verbose)?;
    }
    if cli.unpack {
        fetch::assemble_and_unpack(&opts.download_dir, &cli.audio_dir, opts.verbose)?;
    }

    let Some(program) = opts.extractor.clone() else {
        if cli.fetch || cli.unpack {
            info!("no extractor configured; stopping after acquisition");
            return Ok(());
        }
        bail!("no extractor program configured (use --extractor or .featmill.toml)");
    };
    let executor = CommandExecutor::new(program, opts.extractor_args.clone());

    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;

    let summary = crate::extract_dir(&cli.audio_dir, &opts, &executor, Some(cancel))?;
    report_summary(&summary)
}

/// Print the run summary; enumerate failed inputs so the user can rerun to
/// retry just the remainder. Large failure lists spill to a file.
fn report_summary(summary: &RunSummary) -> Result<()> {
    info!(
        "{} candidates | {} | {} | {}",
        summary.candidates,
        Colors::colorize(Colors::SKIPPED, &format!("skipped: {}", summary.skipped)),
        Colors::colorize(Colors::OK, &format!("extracted: {}", summary.succeeded)),
        Colors::colorize(Colors::FAILED, &format!("failed: {}", summary.failed.len())),
    );

    if !summary.failed.is_empty() {
        if summary.failed.len() <= FAILED_LIST_THRESHOLD {
            for path in &summary.failed {
                warn!("failed: {}", path.display());
            }
        } else {
            let list_path = PathBuf::from(PackagePaths::get().failed_list_filename());
            write_failed_list(&list_path, &summary.failed)?;
            warn!(
                "{} failed inputs written to {}",
                summary.failed.len(),
                list_path.display()
            );
        }
    }

    if summary.cancelled {
        bail!("run cancelled by user; completed artifacts were kept");
    }
    if !summary.failed.is_empty() {
        bail!(
            "{} of {} jobs failed; rerun to retry the remainder",
            summary.failed.len(),
            summary.candidates - summary.skipped
        );
    }
    Ok(())
}

fn write_failed_list(list_path: &std::path::Path, failed: &[PathBuf]) -> Result<()> {
    let mut file = std::fs::File::create(list_path)
        .with_context(|| format!("create {}", list_path.display()))?;
    for path in failed {
        writeln!(file, "{}", path.display())?;
    }
    Ok(())
}
