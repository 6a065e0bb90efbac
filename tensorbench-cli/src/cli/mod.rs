//! Command-line interface orchestration for tensorbench.
//!
//! Commands either print one of the benchmark configuration tables or run
//! the dataset helpers, streaming their progress to a caller-supplied writer.

mod commands;

pub use commands::{
    Cli, CliError, Command, ConvertArgs, DatasetArgs, DtypesArgs, ExecutionSummary, FetchArgs,
    UnzipArgs, render_summary, run_cli, run_cli_with,
};
