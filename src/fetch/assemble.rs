//! Archive assembly collaborator: concatenate the ordered parts into one
//! logical zip and unpack it into the audio tree.

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::fs;
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::engine::progress::{create_progress_bar, update_progress_bar};
use crate::engine::tools::ensure_dir;
use crate::utils::config::{FetchConsts, TMP_SUFFIX};

/// Part files in `download_dir`, ordered by name. Parts are zero-padded, so
/// lexicographic order is archive order.
fn ordered_parts(download_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut parts = Vec::new();
    let entries = fs::read_dir(download_dir)
        .with_context(|| format!("read {}", download_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(FetchConsts::PART_PREFIX) && !name.ends_with(TMP_SUFFIX) {
            parts.push(entry.path());
        }
    }
    parts.sort();
    Ok(parts)
}

/// Concatenate the archive parts into an anonymous temp file and extract
/// every entry into `audio_dir`. Entry paths are sanitized; anything that
/// would escape the target is skipped with a warning.
pub fn assemble_and_unpack(download_dir: &Path, audio_dir: &Path, verbose: bool) -> Result<()> {
    let parts = ordered_parts(download_dir)?;
    if parts.is_empty() {
        bail!(
            "no archive parts named {}* under {}",
            FetchConsts::PART_PREFIX,
            download_dir.display()
        );
    }
    ensure_dir(audio_dir)?;

    let mut assembled = tempfile::tempfile().context("create temp archive")?;
    for part in &parts {
        debug!("appending {}", part.display());
        let mut f = fs::File::open(part).with_context(|| format!("open {}", part.display()))?;
        io::copy(&mut f, &mut assembled)?;
    }
    assembled.seek(SeekFrom::Start(0))?;

    let mut archive = ZipArchive::new(assembled).context("read assembled archive")?;
    info!(
        "unpacking {} entries into {}",
        archive.len(),
        audio_dir.display()
    );
    let bar = verbose.then(|| create_progress_bar(archive.len(), "Unpacking"));

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(rel) = entry.enclosed_name() else {
            warn!("skipping archive entry with unsafe path: {}", entry.name());
            continue;
        };
        let dest = audio_dir.join(rel);
        if entry.is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out =
                fs::File::create(&dest).with_context(|| format!("create {}", dest.display()))?;
            io::copy(&mut entry, &mut out)?;
        }
        if let Some(bar) = &bar {
            update_progress_bar(bar, 1);
        }
    }
    Ok(())
}
