//! vsixfetch CLI - download VS Code extensions for offline installation.

mod cli;
mod commands;
mod error;
mod progress;

use clap::Parser;
use vsixfetch::logging::{init_logging, LogConfig};

use cli::{Cli, Commands};
use error::CliError;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Held until exit so the file writer flushes.
    let _log_guard = init_logging(&LogConfig {
        verbose: cli.verbose,
        log_file: cli.log_file.clone(),
    })?;

    tracing::debug!(version = vsixfetch::VERSION, "vsixfetch starting");

    match cli.command {
        Commands::Download {
            manifest,
            output,
            concurrency,
            dry_run,
        } => commands::download::run(commands::download::DownloadArgs {
            manifest,
            output,
            concurrency,
            dry_run,
            config: cli.config,
        }),
        Commands::Check { manifest } => commands::check::run(&manifest),
        Commands::Config(command) => commands::config::run(command, cli.config.as_deref()),
    }
}
