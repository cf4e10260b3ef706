// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `hashgate`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hashgate",
    version,
    about = "Decide cheaply whether files changed since a recorded snapshot.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Hashgate.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HASHGATE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the content digest of a file.
    Hash {
        path: PathBuf,
    },

    /// Record the current hash and modification time of files as a manifest.
    Snapshot {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write the manifest here instead of stdout.
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Report which files changed relative to a manifest.
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Manifest produced by `snapshot`. Without one every file is
        /// reported as changed.
        #[arg(long, short, value_name = "FILE")]
        manifest: Option<PathBuf>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
