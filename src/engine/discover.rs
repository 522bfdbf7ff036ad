//! File discovery: recursive walk of the audio root filtered by a glob pattern.

use glob::{MatchOptions, Pattern};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::types::FeatmillError;

/// Match options for candidate patterns: `*` does not cross `/` and hidden
/// files need a literal leading dot, so `**/*.mp3` behaves like a shell glob.
fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    }
}

/// Compile `pattern`, rejecting malformed globs before any work starts.
pub fn compile_pattern(pattern: &str) -> Result<Pattern, FeatmillError> {
    Pattern::new(pattern)
        .map_err(|e| FeatmillError::Config(format!("bad pattern {pattern:?}: {e}")))
}

/// Walk `root` and return every regular file whose root-relative path matches
/// `pattern`. Order is whatever the walk yields; callers must not rely on it.
/// Symlinks are not followed. Unreadable sub-paths are logged and skipped;
/// only a missing root is fatal.
pub fn discover(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, FeatmillError> {
    if !root.is_dir() {
        return Err(FeatmillError::NotFound(root.to_path_buf()));
    }
    let pattern = compile_pattern(pattern)?;
    let options = match_options();

    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
                if pattern.matches_path_with(rel, options) {
                    found.push(entry.into_path());
                }
            }
            Err(err) => warn!("skipping unreadable path: {err}"),
        }
    }
    debug!(
        "discovered {} candidate files under {}",
        found.len(),
        root.display()
    );
    Ok(found)
}
