//! Model artifact downloads
//!
//! Blocking by design: callers run adapter construction on a worker
//! thread. Partial downloads are cleaned up so a failed attempt can
//! be retried from scratch.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, SttError};

const SHERPA_ARCHIVE_URL_FORMAT: &str =
    "https://github.com/k2-fsa/sherpa-onnx/releases/download/asr-models/{model_id}.tar.bz2";

/// Download a single file to `dest`, writing through a temporary
/// sibling so an interrupted download never looks complete.
pub fn fetch_file(url: &str, dest: &Path) -> Result<()> {
    info!("Downloading {}", url);

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let part = dest.with_extension("part");
    let result = (|| -> Result<()> {
        let response = reqwest::blocking::get(url)
            .and_then(|r| r.error_for_status())
            .map_err(|e| SttError::download(e.to_string()))?;

        let mut file = fs::File::create(&part)?;
        let mut reader = response;
        std::io::copy(&mut reader, &mut file)?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&part);
        return Err(e);
    }

    fs::rename(&part, dest)?;
    Ok(())
}

/// Download and unpack a .tar.bz2 archive into `cache_dir`.
///
/// The archive is assumed to contain a directory named `model_dir`'s
/// file name. On any failure that directory is removed so the next
/// attempt downloads again.
pub fn fetch_archive_bz2(url: &str, cache_dir: &Path, model_dir: &Path) -> Result<()> {
    info!("Downloading {}", url);
    fs::create_dir_all(cache_dir)?;

    let result = (|| -> Result<()> {
        let response = reqwest::blocking::get(url)
            .and_then(|r| r.error_for_status())
            .map_err(|e| SttError::download(e.to_string()))?;

        let decoder = bzip2::read::BzDecoder::new(response);
        let mut archive = tar::Archive::new(decoder);
        archive.unpack(cache_dir)?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_dir_all(model_dir);
        return Err(e);
    }

    if !model_dir.exists() {
        return Err(SttError::download(format!(
            "archive did not contain {}",
            model_dir.display()
        )));
    }

    Ok(())
}

/// Find an extracted sherpa-onnx model directory under `cache_dir`,
/// downloading the release archive if allowed.
pub fn ensure_sherpa_model(
    model_id: &str,
    cache_dir: &Path,
    local_files_only: bool,
) -> Result<PathBuf> {
    let model_dir = cache_dir.join(model_id);
    if model_dir.is_dir() {
        debug!("Using cached model {}", model_dir.display());
        return Ok(model_dir);
    }

    if local_files_only {
        return Err(SttError::download(format!(
            "model '{model_id}' not found in {} and downloads are disabled",
            cache_dir.display()
        )));
    }

    let url = SHERPA_ARCHIVE_URL_FORMAT.replace("{model_id}", model_id);
    fetch_archive_bz2(&url, cache_dir, &model_dir)?;
    Ok(model_dir)
}
