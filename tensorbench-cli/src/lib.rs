//! Support library for the tensorbench CLI binary.
//!
//! Re-exports the CLI and logging modules so doctests and integration tests
//! can drive commands without spawning a subprocess.

pub mod cli;
pub mod logging;
