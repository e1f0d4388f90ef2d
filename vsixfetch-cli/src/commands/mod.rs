//! Subcommand implementations.

pub mod check;
pub mod config;
pub mod download;

use std::path::Path;

use vsixfetch::ConfigFile;

use crate::error::CliError;

/// Load the config file: `path` when given (must exist), else the default
/// location (optional).
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    match path {
        Some(path) if !path.exists() => Err(CliError::Config(format!(
            "config file {} does not exist",
            path.display()
        ))),
        Some(path) => Ok(ConfigFile::load_from(path)?),
        None => Ok(ConfigFile::load()?),
    }
}
