//! Download-and-cache helper for benchmark datasets.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::archive::unzip_data_with;
use crate::error::{DataError, io_at};
use crate::fetch::{DownloadClient, UreqDownloadClient, download_file_with, file_name_from_url};

const DATA_DIR_ENV: &str = "TENSORBENCH_DATA_DIR";

/// Configuration for dataset download and cache behaviour.
#[derive(Clone, Debug)]
pub struct DatasetConfig {
    /// Local directory where downloaded archives are cached.
    pub cache_dir: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            cache_dir: resolve_cache_dir(|name| env::var_os(name)),
        }
    }
}

/// Ensures the archive named by `url` is cached, then extracts it into
/// `extract_to`. Status lines go to stdout.
///
/// # Errors
/// Returns [`DataError`] when downloading or extracting fails.
pub fn ensure_dataset(
    config: &DatasetConfig,
    url: &str,
    extract_to: &Path,
) -> Result<PathBuf, DataError> {
    ensure_dataset_with(
        &UreqDownloadClient,
        config,
        url,
        extract_to,
        io::stdout().lock(),
    )
}

/// Ensures the archive named by `url` is present in `config.cache_dir`,
/// downloading it through `client` only when missing, then extracts it into
/// `extract_to`. Returns the cached archive path.
///
/// # Errors
/// Returns [`DataError`] when the cache directory cannot be created, or
/// downloading or extracting fails.
pub fn ensure_dataset_with<W: Write>(
    client: &dyn DownloadClient,
    config: &DatasetConfig,
    url: &str,
    extract_to: &Path,
    mut status: W,
) -> Result<PathBuf, DataError> {
    let cache_dir = config.cache_dir.as_path();
    fs::create_dir_all(cache_dir).map_err(io_at(cache_dir))?;

    let cached = cache_dir.join(file_name_from_url(url)?);
    let archive = if cached.is_file() {
        info!(path = %cached.display(), "using cached archive");
        cached
    } else {
        download_file_with(client, url, Some(cache_dir), &mut status)?
    };

    unzip_data_with(&archive, extract_to, &mut status)?;
    Ok(archive)
}

fn resolve_cache_dir(lookup: impl Fn(&str) -> Option<OsString>) -> PathBuf {
    if let Some(explicit) = lookup(DATA_DIR_ENV) {
        return PathBuf::from(explicit);
    }

    if let Some(xdg_cache) = lookup("XDG_CACHE_HOME") {
        return PathBuf::from(xdg_cache).join("tensorbench");
    }

    if let Some(home) = lookup("HOME") {
        return PathBuf::from(home).join(".cache").join("tensorbench");
    }

    env::temp_dir().join("tensorbench")
}
