use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tensorbench_core::{
    ArrayDtype, Device, Dtype, DtypeError, list_devices, list_float_dtypes, list_non_bool_dtypes,
    list_tensor_sizes, to_array_dtype,
};
use tensorbench_data::{
    DataError, DatasetConfig, UreqDownloadClient, download_file_with, ensure_dataset_with,
    unzip_data_with,
};
use thiserror::Error;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "tensorbench",
    about = "Benchmark configuration tables and dataset helpers."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List tensor element counts used by benchmarks.
    Sizes,
    /// List benchmark dtypes.
    Dtypes(DtypesArgs),
    /// List devices available for benchmarking.
    Devices,
    /// Show the array dtype equivalent of a tensor dtype.
    Convert(ConvertArgs),
    /// Download a file, printing progress.
    Fetch(FetchArgs),
    /// Extract a zip archive.
    Unzip(UnzipArgs),
    /// Download an archive into the cache if missing, then extract it.
    Dataset(DatasetArgs),
}

/// Options accepted by the `dtypes` command.
#[derive(Debug, Args, Clone, Default)]
pub struct DtypesArgs {
    /// Only list floating-point dtypes.
    #[arg(long)]
    pub float_only: bool,
}

/// Options accepted by the `convert` command.
#[derive(Debug, Args, Clone)]
pub struct ConvertArgs {
    /// Tensor dtype name, such as `float32` or `bool8`.
    pub dtype: Dtype,
}

/// Options accepted by the `fetch` command.
#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// URL of the file to download.
    pub url: String,
    /// Directory to write into (defaults to the current directory).
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Options accepted by the `unzip` command.
#[derive(Debug, Args, Clone)]
pub struct UnzipArgs {
    /// Path of the zip archive.
    pub archive: PathBuf,
    /// Directory to extract into.
    pub destination: PathBuf,
}

/// Options accepted by the `dataset` command.
#[derive(Debug, Args, Clone)]
pub struct DatasetArgs {
    /// URL of the dataset archive.
    pub url: String,
    /// Directory to extract into.
    pub destination: PathBuf,
    /// Cache directory override (defaults to `TENSORBENCH_DATA_DIR` or the
    /// user cache directory).
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A dtype lookup failed.
    #[error(transparent)]
    Dtype(#[from] DtypeError),
    /// Downloading or extracting data failed.
    #[error(transparent)]
    Data(#[from] DataError),
}

impl CliError {
    /// Stable machine-readable code of the underlying failure.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Dtype(err) => err.code().as_str(),
            Self::Data(err) => err.code().as_str(),
        }
    }
}

/// Outcome of a CLI command, rendered by [`render_summary`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionSummary {
    /// Tensor element counts.
    Sizes(Vec<usize>),
    /// Dtypes in benchmark order.
    Dtypes(Vec<Dtype>),
    /// Devices in benchmark order.
    Devices(Vec<Device>),
    /// A dtype and its array equivalent.
    Converted {
        /// Tensor dtype supplied by the user.
        dtype: Dtype,
        /// Matching array dtype.
        array: ArrayDtype,
    },
    /// Path of a downloaded file.
    Fetched(PathBuf),
    /// Directory an archive was extracted into.
    Extracted(PathBuf),
    /// Cached archive and extraction directory of a dataset.
    Dataset {
        /// Cached archive path.
        archive: PathBuf,
        /// Extraction directory.
        destination: PathBuf,
    },
}

/// Executes `cli`, sending download and extraction progress to stdout.
///
/// # Errors
/// Returns [`CliError`] when a lookup, download, or extraction fails.
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    run_cli_with(cli, io::stdout().lock())
}

/// Executes `cli`, sending download and extraction progress to `status`.
///
/// # Errors
/// Returns [`CliError`] when a lookup, download, or extraction fails.
///
/// # Examples
/// ```
/// use tensorbench_cli::cli::{Cli, Command, ConvertArgs, ExecutionSummary, run_cli_with};
/// use tensorbench_core::{ArrayDtype, Dtype};
///
/// let cli = Cli {
///     command: Command::Convert(ConvertArgs { dtype: Dtype::Int16 }),
/// };
/// let summary = run_cli_with(cli, Vec::new()).expect("int16 converts");
/// assert_eq!(
///     summary,
///     ExecutionSummary::Converted { dtype: Dtype::Int16, array: ArrayDtype::I16 }
/// );
/// ```
pub fn run_cli_with<W: Write>(cli: Cli, status: W) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Sizes => Ok(ExecutionSummary::Sizes(list_tensor_sizes())),
        Command::Dtypes(args) => Ok(ExecutionSummary::Dtypes(list_dtypes(&args))),
        Command::Devices => Ok(ExecutionSummary::Devices(list_devices())),
        Command::Convert(ConvertArgs { dtype }) => Ok(ExecutionSummary::Converted {
            dtype,
            array: to_array_dtype(dtype)?,
        }),
        Command::Fetch(args) => run_fetch(args, status),
        Command::Unzip(args) => run_unzip(args, status),
        Command::Dataset(args) => run_dataset(args, status),
    }
}

pub(super) fn list_dtypes(args: &DtypesArgs) -> Vec<Dtype> {
    if args.float_only {
        list_float_dtypes()
    } else {
        list_non_bool_dtypes()
    }
}

fn run_fetch<W: Write>(args: FetchArgs, status: W) -> Result<ExecutionSummary, CliError> {
    let FetchArgs { url, out_dir } = args;
    let path = download_file_with(&UreqDownloadClient, &url, out_dir.as_deref(), status)?;
    Ok(ExecutionSummary::Fetched(path))
}

fn run_unzip<W: Write>(args: UnzipArgs, status: W) -> Result<ExecutionSummary, CliError> {
    let UnzipArgs {
        archive,
        destination,
    } = args;
    unzip_data_with(&archive, &destination, status)?;
    Ok(ExecutionSummary::Extracted(destination))
}

fn run_dataset<W: Write>(args: DatasetArgs, status: W) -> Result<ExecutionSummary, CliError> {
    let DatasetArgs {
        url,
        destination,
        cache_dir,
    } = args;
    let config = cache_dir.map_or_else(DatasetConfig::default, |dir| DatasetConfig {
        cache_dir: dir,
    });
    let archive = ensure_dataset_with(&UreqDownloadClient, &config, &url, &destination, status)?;
    Ok(ExecutionSummary::Dataset {
        archive,
        destination,
    })
}

/// Writes a human-readable rendering of `summary` to `writer`.
///
/// # Errors
/// Returns any I/O error raised by `writer`.
///
/// # Examples
/// ```
/// use tensorbench_cli::cli::{ExecutionSummary, render_summary};
/// use tensorbench_core::Device;
///
/// let mut buffer = Vec::new();
/// render_summary(&ExecutionSummary::Devices(vec![Device::cpu(0)]), &mut buffer)?;
/// assert_eq!(buffer, b"CPU:0\n");
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Sizes(sizes) => {
            for size in sizes {
                writeln!(writer, "{size}")?;
            }
        }
        ExecutionSummary::Dtypes(dtypes) => {
            for dtype in dtypes {
                writeln!(writer, "{dtype}")?;
            }
        }
        ExecutionSummary::Devices(devices) => {
            for device in devices {
                writeln!(writer, "{device}")?;
            }
        }
        ExecutionSummary::Converted { dtype, array } => {
            writeln!(writer, "{dtype} -> {array:?}")?;
        }
        ExecutionSummary::Fetched(path) => writeln!(writer, "saved {}", path.display())?,
        ExecutionSummary::Extracted(path) => writeln!(writer, "extracted {}", path.display())?,
        ExecutionSummary::Dataset {
            archive,
            destination,
        } => writeln!(
            writer,
            "dataset {} extracted to {}",
            archive.display(),
            destination.display()
        )?,
    }
    Ok(())
}
