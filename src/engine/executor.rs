//! Executor boundary: how a job's external computation is invoked.

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::engine::tools::tmp_sibling;
use crate::types::FeatmillError;

/// One unit of external computation: consume `input`, leave a finished
/// artifact at `output`. The pool observes only termination, never internal
/// behavior; tests substitute an impl that simulates outcomes.
pub trait JobExecutor: Send + Sync {
    fn execute(&self, input: &Path, output: &Path) -> Result<(), FeatmillError>;
}

/// Production executor: spawns `program [args…] <input> <tmp>` and renames
/// `tmp` over `output` on exit 0. The rename keeps an interrupted write from
/// ever being visible as a completed artifact to a later run's skip check.
pub struct CommandExecutor {
    program: PathBuf,
    prefix_args: Vec<String>,
}

impl CommandExecutor {
    pub fn new(program: impl Into<PathBuf>, prefix_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args,
        }
    }
}

impl JobExecutor for CommandExecutor {
    fn execute(&self, input: &Path, output: &Path) -> Result<(), FeatmillError> {
        let tmp = tmp_sibling(output);
        let status = Command::new(&self.program)
            .args(&self.prefix_args)
            .arg(input)
            .arg(&tmp)
            .status()
            .map_err(|e| FeatmillError::Extractor {
                input: input.to_path_buf(),
                reason: format!("spawn {}: {e}", self.program.display()),
            })?;

        if !status.success() {
            discard_partial(&tmp);
            return Err(FeatmillError::Extractor {
                input: input.to_path_buf(),
                reason: format!("exit status {status}"),
            });
        }
        if !tmp.is_file() {
            return Err(FeatmillError::Extractor {
                input: input.to_path_buf(),
                reason: "exited 0 without writing an artifact".to_string(),
            });
        }
        fs::rename(&tmp, output).map_err(|source| {
            discard_partial(&tmp);
            FeatmillError::Io {
                path: output.to_path_buf(),
                source,
            }
        })?;
        debug!("extracted {} -> {}", input.display(), output.display());
        Ok(())
    }
}

fn discard_partial(tmp: &Path) {
    if tmp.exists()
        && let Err(err) = fs::remove_file(tmp)
    {
        warn!("could not remove partial artifact {}: {err}", tmp.display());
    }
}
