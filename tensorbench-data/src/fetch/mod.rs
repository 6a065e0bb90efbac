//! Streaming file downloader with coarse progress reporting.

use std::fs::{self, File};
use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::error::{DataError, io_at, output_error};
use crate::progress::{DownloadProgress, mebibytes};

/// Size of each read from the response body.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// An opened response: the declared length and a reader over the body.
pub struct Transfer {
    /// Value of the `Content-Length` header, if present and numeric.
    pub content_length: Option<u64>,
    /// Response body.
    pub body: Box<dyn Read>,
}

/// HTTP client abstraction used by the download helpers.
pub trait DownloadClient {
    /// Issues a GET request for `url` and returns the response body.
    ///
    /// # Errors
    /// Returns [`DataError::Download`] if the request fails or the server
    /// answers with an error status.
    fn open(&self, url: &str) -> Result<Transfer, DataError>;
}

/// [`DownloadClient`] backed by a blocking `ureq` agent.
#[derive(Clone, Copy, Debug, Default)]
pub struct UreqDownloadClient;

impl DownloadClient for UreqDownloadClient {
    fn open(&self, url: &str) -> Result<Transfer, DataError> {
        let response = ureq::get(url)
            .call()
            .map_err(|error| DataError::Download {
                url: url.to_owned(),
                message: error.to_string(),
            })?;

        let content_length = response
            .headers()
            .get("content-length")
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| raw.trim().parse::<u64>().ok());
        let body = response.into_body().into_reader();
        Ok(Transfer {
            content_length,
            body: Box::new(body),
        })
    }
}

/// Downloads `url` into `out_dir` (the current directory when `None`),
/// printing progress to stdout. Returns the path of the written file.
///
/// # Errors
/// Returns [`DataError`] when the URL names no file, the request or transfer
/// fails, or the file cannot be written.
pub fn download_file(url: &str, out_dir: Option<&Path>) -> Result<PathBuf, DataError> {
    download_file_with(&UreqDownloadClient, url, out_dir, io::stdout().lock())
}

/// Downloads `url` into `out_dir` (the current directory when `None`) through
/// `client`, writing status lines to `status`.
///
/// The body is streamed into `{name}.part` and renamed to `{name}` once the
/// transfer completes; the partial file is removed on failure.
///
/// # Errors
/// Returns [`DataError`] when the URL names no file, the request or transfer
/// fails, the body is shorter than the declared length, or a file cannot be
/// written.
#[instrument(skip(client, status))]
pub fn download_file_with<W: Write>(
    client: &dyn DownloadClient,
    url: &str,
    out_dir: Option<&Path>,
    mut status: W,
) -> Result<PathBuf, DataError> {
    let file_name = file_name_from_url(url)?;
    let directory = destination_dir(out_dir);
    fs::create_dir_all(directory).map_err(io_at(directory))?;
    let destination = directory.join(file_name);
    let partial = partial_path(&destination);

    let transfer = client.open(url)?;
    writeln!(status, "Downloading: {file_name}").map_err(output_error)?;

    let outcome = stream_to_file(url, transfer, &partial, &mut status).and_then(|received| {
        fs::rename(&partial, &destination).map_err(io_at(&destination))?;
        Ok(received)
    });
    match outcome {
        Ok(received) => {
            info!(path = %destination.display(), bytes = received, "download complete");
            Ok(destination)
        }
        Err(err) => {
            if let Err(cleanup) = fs::remove_file(&partial) {
                warn!(path = %partial.display(), error = %cleanup, "failed to remove partial download");
            }
            Err(err)
        }
    }
}

fn stream_to_file<W: Write>(
    url: &str,
    transfer: Transfer,
    path: &Path,
    status: &mut W,
) -> Result<u64, DataError> {
    let Transfer {
        content_length,
        mut body,
    } = transfer;
    let mut file = File::create(path).map_err(io_at(path))?;
    let mut progress = DownloadProgress::new(content_length);
    let mut buffer = [0_u8; CHUNK_SIZE];

    loop {
        let read = match body.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(DataError::Transfer {
                    url: url.to_owned(),
                    received: progress.received(),
                    source,
                });
            }
        };
        let Some(chunk) = buffer.get(..read) else {
            return Err(DataError::Transfer {
                url: url.to_owned(),
                received: progress.received(),
                source: io::Error::new(
                    ErrorKind::InvalidData,
                    format!("body reported {read} bytes for a {CHUNK_SIZE}-byte buffer"),
                ),
            });
        };
        file.write_all(chunk).map_err(io_at(path))?;

        if let Some(report) = progress.record(read) {
            debug!(percent = report.percent(), bytes = report.received(), "download progress");
            writeln!(status, "{report}").map_err(output_error)?;
        }
    }
    file.sync_all().map_err(io_at(path))?;

    let received = progress.received();
    match progress.total() {
        Some(expected) if received < expected => Err(DataError::Truncated {
            url: url.to_owned(),
            received,
            expected,
        }),
        Some(_) => Ok(received),
        None => {
            writeln!(status, " {:.1} MB (size not declared)", mebibytes(received))
                .map_err(output_error)?;
            Ok(received)
        }
    }
}

/// Returns the final path segment of `url`, ignoring any query or fragment.
///
/// # Errors
/// Returns [`DataError::InvalidUrl`] when the segment is empty or is not a
/// plain file name.
///
/// # Examples
/// ```
/// use tensorbench_data::file_name_from_url;
///
/// let name = file_name_from_url("http://example.test/sets/data.zip?v=2")
///     .expect("URL names a file");
/// assert_eq!(name, "data.zip");
/// ```
pub fn file_name_from_url(url: &str) -> Result<&str, DataError> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let without_query = without_fragment
        .split('?')
        .next()
        .unwrap_or(without_fragment);
    let name = without_query.rsplit('/').next().unwrap_or(without_query);

    let is_plain =
        !name.is_empty() && Path::new(name).file_name().is_some_and(|file| file == name);
    if is_plain {
        Ok(name)
    } else {
        Err(DataError::InvalidUrl {
            url: url.to_owned(),
        })
    }
}

/// Directory downloads land in when no output directory is given.
fn destination_dir(out_dir: Option<&Path>) -> &Path {
    out_dir.unwrap_or_else(|| Path::new("."))
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    destination.with_file_name(name)
}

#[cfg(test)]
mod tests;
