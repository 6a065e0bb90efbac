//! Zip archive extraction.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tracing::{info, instrument};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{DataError, io_at, output_error};

/// Extracts every member of `zip_path` into `extract_to`, printing start and
/// completion lines to stdout.
///
/// # Errors
/// Returns [`DataError::Archive`] if the file is not a valid zip archive and
/// [`DataError::Io`] if the archive cannot be opened or the destination cannot
/// be written.
pub fn unzip_data(zip_path: &Path, extract_to: &Path) -> Result<(), DataError> {
    unzip_data_with(zip_path, extract_to, io::stdout().lock())
}

/// Extracts every member of `zip_path` into `extract_to`, writing status
/// lines to `status`.
///
/// Intermediate directories are created as needed and existing files are
/// overwritten.
///
/// # Errors
/// Returns [`DataError::Archive`] if the file is not a valid zip archive and
/// [`DataError::Io`] if the archive cannot be opened or the destination cannot
/// be written.
#[instrument(skip(status))]
pub fn unzip_data_with<W: Write>(
    zip_path: &Path,
    extract_to: &Path,
    mut status: W,
) -> Result<(), DataError> {
    writeln!(status, "Unzipping {}", zip_path.display()).map_err(output_error)?;

    let file = File::open(zip_path).map_err(io_at(zip_path))?;
    let mut archive = ZipArchive::new(file).map_err(|source| archive_error(zip_path, source))?;
    fs::create_dir_all(extract_to).map_err(io_at(extract_to))?;
    archive.extract(extract_to).map_err(|source| match source {
        ZipError::Io(err) => io_at(extract_to)(err),
        other => archive_error(zip_path, other),
    })?;

    info!(
        members = archive.len(),
        destination = %extract_to.display(),
        "archive extracted"
    );
    writeln!(status, "Extracted to {}", extract_to.display()).map_err(output_error)?;
    Ok(())
}

fn archive_error(path: &Path, source: ZipError) -> DataError {
    DataError::Archive {
        path: path.to_path_buf(),
        source,
    }
}
