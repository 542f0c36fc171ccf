//! Command-line interface for rankforge.
//!
//! Provides the `run` command (execute the pipeline) and the `compile`
//! command (emit the YAML pipeline manifest).

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli};
