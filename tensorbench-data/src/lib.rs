//! Dataset helpers for tensor benchmarks.
//!
//! Streams benchmark datasets over HTTP with coarse progress output, unpacks
//! zip archives, and caches downloads so repeated benchmark runs only pay for
//! the transfer once.

mod archive;
mod dataset;
mod error;
mod fetch;
mod progress;

pub use crate::{
    archive::{unzip_data, unzip_data_with},
    dataset::{DatasetConfig, ensure_dataset, ensure_dataset_with},
    error::{DataError, DataErrorCode},
    fetch::{
        CHUNK_SIZE, DownloadClient, Transfer, UreqDownloadClient, download_file,
        download_file_with, file_name_from_url,
    },
    progress::{DownloadProgress, ProgressReport},
};
