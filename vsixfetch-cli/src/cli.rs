//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::config::ConfigCommands;

/// Default manifest file name, looked up in the working directory.
pub const DEFAULT_MANIFEST: &str = "extensions.ini";

#[derive(Debug, Parser)]
#[command(name = "vsixfetch")]
#[command(version, about = "Download VS Code extensions from the marketplace", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ~/.config/vsixfetch/config.ini)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve the manifest and download every package
    Download {
        /// Extension manifest
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,

        /// Output directory (overrides download.output_dir)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Simultaneous downloads (overrides download.concurrency)
        #[arg(short = 'j', long, value_name = "N")]
        concurrency: Option<usize>,

        /// Print the download plan without downloading
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the manifest without contacting the marketplace
    Check {
        /// Extension manifest
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}
