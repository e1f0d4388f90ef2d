//! Check command - validate a manifest offline.

use std::path::Path;

use vsixfetch::{ExtensionRequest, Manifest};

use crate::error::CliError;

/// Run the check command.
pub fn run(manifest_path: &Path) -> Result<(), CliError> {
    let manifest = Manifest::load(manifest_path)?;

    println!(
        "{}: {} extension(s) OK",
        manifest_path.display(),
        manifest.len()
    );
    for request in manifest.extensions() {
        println!("  {}", describe(request));
    }

    Ok(())
}

/// One-line summary of a request, e.g. `ms-python.python@2024.2.0 [linux-x64]`.
fn describe(request: &ExtensionRequest) -> String {
    let mut line = request.id.to_string();
    match &request.version {
        Some(version) => {
            line.push('@');
            line.push_str(version);
        }
        None => line.push_str(" (latest)"),
    }
    if request.wants_platforms() {
        let platforms: Vec<&str> = request.platforms.iter().map(|p| p.as_str()).collect();
        line.push_str(&format!(" [{}]", platforms.join(", ")));
    }
    line
}
