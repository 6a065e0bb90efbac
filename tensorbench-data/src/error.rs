//! Error types for dataset download and extraction.

use std::io;
use std::path::{Path, PathBuf};

use tensorbench_core::define_error_codes;
use thiserror::Error;

/// Errors that may occur while fetching or unpacking benchmark datasets.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DataError {
    /// The URL has no final path segment to use as a file name.
    #[error("URL `{url}` does not name a file")]
    InvalidUrl {
        /// URL supplied by the caller.
        url: String,
    },
    /// The request could not be issued or was answered with an error status.
    #[error("dataset download failed for `{url}`: {message}")]
    Download {
        /// URL that failed.
        url: String,
        /// Human-readable failure message.
        message: String,
    },
    /// Reading the response body failed mid-transfer.
    #[error("transfer from `{url}` failed after {received} bytes: {source}")]
    Transfer {
        /// URL being streamed.
        url: String,
        /// Bytes received before the failure.
        received: u64,
        /// Underlying read failure.
        #[source]
        source: io::Error,
    },
    /// The response ended before the declared transfer length was reached.
    #[error("transfer from `{url}` ended after {received} of {expected} bytes")]
    Truncated {
        /// URL being streamed.
        url: String,
        /// Bytes received.
        received: u64,
        /// Transfer length declared by the server.
        expected: u64,
    },
    /// Reading or writing a local file failed.
    #[error("I/O failure at `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The archive could not be read or extracted.
    #[error("invalid archive `{path}`: {source}")]
    Archive {
        /// Path of the archive.
        path: PathBuf,
        /// Underlying archive failure.
        #[source]
        source: zip::result::ZipError,
    },
    /// Writing a status line failed.
    #[error("failed to write status output: {source}")]
    Output {
        /// Underlying write failure.
        #[source]
        source: io::Error,
    },
}

define_error_codes! {
    /// Stable codes describing [`DataError`] variants.
    enum DataErrorCode for DataError {
        /// The URL has no final path segment to use as a file name.
        InvalidUrl => InvalidUrl { .. } => "DATA_INVALID_URL",
        /// The request could not be issued or was answered with an error status.
        Download => Download { .. } => "DATA_DOWNLOAD",
        /// Reading the response body failed mid-transfer.
        Transfer => Transfer { .. } => "DATA_TRANSFER",
        /// The response ended before the declared transfer length was reached.
        Truncated => Truncated { .. } => "DATA_TRUNCATED",
        /// Reading or writing a local file failed.
        Io => Io { .. } => "DATA_IO",
        /// The archive could not be read or extracted.
        Archive => Archive { .. } => "DATA_ARCHIVE",
        /// Writing a status line failed.
        Output => Output { .. } => "DATA_OUTPUT",
    }
}

/// Builds a `map_err` adapter that attaches `path` to an I/O failure.
pub(crate) fn io_at(path: &Path) -> impl FnOnce(io::Error) -> DataError + '_ {
    move |source| DataError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Adapter for `map_err` on status-line writes.
pub(crate) fn output_error(source: io::Error) -> DataError {
    DataError::Output { source }
}
