//! Path helpers shared across the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::FeatmillError;
use crate::utils::config::TMP_SUFFIX;

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Create `dir` if missing. An existing dir is fine; any other error is `Io`.
pub fn ensure_dir(dir: &Path) -> Result<(), FeatmillError> {
    fs::create_dir_all(dir).map_err(|source| FeatmillError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// In-progress sibling for `path` (`<name>.part`). Work lands here first and
/// is renamed into place on success, so a partial write is never visible
/// under the final name.
pub fn tmp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}{TMP_SUFFIX}"))
}
