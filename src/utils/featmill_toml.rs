//! Load `.featmill.toml` from a directory (CLI only). Lib callers inject
//! config via [`Opts`](crate::Opts) directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Deserialize)]
pub(crate) struct FeatmillToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    out_dir: Option<String>,
    pattern: Option<String>,
    artifact_ext: Option<String>,
    jobs: Option<usize>,
    force: Option<bool>,
    verbose: Option<bool>,
    extractor: Option<String>,
    extractor_args: Option<Vec<String>>,
    url_base: Option<String>,
    parts: Option<u32>,
    download_dir: Option<String>,
}

/// Load `.featmill.toml` from `dir` if present. Returns None if the file is
/// missing or unreadable. CLI only.
pub(crate) fn load_featmill_toml(dir: &Path) -> Option<FeatmillToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    toml::from_str(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite opts field from file when present (Copy fields).
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $file_field:ident => $opts_field:ident) => {
        if let Some(v) = $section.$file_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before
/// applying CLI flags so explicit flags win.
pub(crate) fn apply_file_to_opts(file: &FeatmillToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(ref p) = s.out_dir {
        opts.out_dir = PathBuf::from(p);
    }
    if let Some(ref p) = s.pattern {
        opts.pattern = p.clone();
    }
    if let Some(ref e) = s.artifact_ext {
        opts.artifact_ext = e.clone();
    }
    apply_file_opt!(s, opts, jobs => jobs);
    apply_file_opt!(s, opts, force => force);
    apply_file_opt!(s, opts, verbose => verbose);
    if let Some(ref x) = s.extractor {
        opts.extractor = Some(PathBuf::from(x));
    }
    if let Some(ref args) = s.extractor_args {
        opts.extractor_args = args.clone();
    }
    if let Some(ref u) = s.url_base {
        opts.url_base = u.clone();
    }
    apply_file_opt!(s, opts, parts => parts);
    if let Some(ref d) = s.download_dir {
        opts.download_dir = PathBuf::from(d);
    }
}
