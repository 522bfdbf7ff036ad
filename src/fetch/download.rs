//! Download collaborator: fetch numbered archive parts over HTTPS.

use anyhow::{Context, Result};
use log::{info, warn};
use reqwest::blocking::Client;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::engine::progress::{create_byte_bar, update_progress_bar};
use crate::engine::tools::{ensure_dir, tmp_sibling};
use crate::utils::config::FetchConsts;

/// Name of part `i` on the mirror and on disk (`mp3.zip.001` style).
pub fn part_name(i: u32) -> String {
    format!("{}{i:03}", FetchConsts::PART_PREFIX)
}

/// Fetch parts `1..=parts` into `download_dir`. Parts already present are
/// kept (rerun-friendly); each part lands via a `.part` sibling and is
/// renamed on completion, so an interrupted download is never mistaken for a
/// finished part.
pub fn download_parts(
    url_base: &str,
    parts: u32,
    download_dir: &Path,
    verbose: bool,
) -> Result<Vec<PathBuf>> {
    ensure_dir(download_dir)?;
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(FetchConsts::CONNECT_TIMEOUT_SECS))
        .build()
        .context("build http client")?;

    let mut fetched = Vec::new();
    for i in 1..=parts {
        let name = part_name(i);
        let dest = download_dir.join(&name);
        if dest.exists() {
            info!("part {name} already downloaded, skipping");
            fetched.push(dest);
            continue;
        }
        let url = format!("{url_base}{i:03}");
        info!("downloading part {i}/{parts} from {url}");
        download_with_retries(&client, &url, &dest, verbose)
            .with_context(|| format!("download {url}"))?;
        fetched.push(dest);
    }
    Ok(fetched)
}

/// Retry transient failures (connect/timeout/5xx) with a backoff warning;
/// anything else, or attempt exhaustion, propagates.
fn download_with_retries(client: &Client, url: &str, dest: &Path, verbose: bool) -> Result<()> {
    let mut attempt: u32 = 1;
    loop {
        match download_one(client, url, dest, verbose) {
            Ok(()) => return Ok(()),
            Err(err) if attempt < FetchConsts::MAX_ATTEMPTS && is_transient(&err) => {
                warn!("attempt {attempt} failed ({err:#}); retrying");
                thread::sleep(Duration::from_secs(
                    FetchConsts::RETRY_BACKOFF_SECS * u64::from(attempt),
                ));
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

fn is_transient(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<reqwest::Error>() {
        Some(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status().is_some_and(|s| s.is_server_error())
        }
        None => false,
    }
}

/// Stream one part to `<dest>.part`, then rename into place.
fn download_one(client: &Client, url: &str, dest: &Path, verbose: bool) -> Result<()> {
    let mut response = client.get(url).send()?.error_for_status()?;
    let total = response.content_length().unwrap_or(0) as usize;
    let bar = verbose.then(|| create_byte_bar(total, "Downloading"));

    let tmp = tmp_sibling(dest);
    let mut file =
        fs::File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
    let mut buf = vec![0u8; FetchConsts::CHUNK_SIZE];
    loop {
        let n = response.read(&mut buf)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
        if let Some(bar) = &bar {
            update_progress_bar(bar, n);
        }
    }
    file.flush()?;
    drop(file);
    fs::rename(&tmp, dest).with_context(|| format!("finalize {}", dest.display()))?;
    Ok(())
}
