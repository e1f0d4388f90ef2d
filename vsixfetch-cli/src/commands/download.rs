//! Download command - resolve the manifest and fetch every package.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use console::style;
use indicatif::HumanBytes;
use tokio_util::sync::CancellationToken;
use vsixfetch::{
    resolve_all, ConfigFile, FallbackPolicy, FetchEngine, GalleryClient, HttpFetcher, Manifest,
    Target,
};

use super::load_config;
use crate::error::CliError;
use crate::progress::DownloadProgress;

/// Arguments for the download command.
pub struct DownloadArgs {
    pub manifest: PathBuf,
    pub output: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub dry_run: bool,
    pub config: Option<PathBuf>,
}

/// Run the download command.
pub fn run(args: DownloadArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let manifest = Manifest::load(&args.manifest)?;

    // CLI > config
    let output_dir = args
        .output
        .unwrap_or_else(|| config.download.output_dir.clone());
    let concurrency = args.concurrency.unwrap_or(config.download.concurrency);
    if concurrency == 0 {
        return Err(CliError::Config("concurrency must be at least 1".to_string()));
    }

    tracing::info!(
        manifest = %args.manifest.display(),
        extensions = manifest.len(),
        "Loaded manifest"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(format!("Failed to start async runtime: {}", e)))?;

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received interrupt, cancelling downloads...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Runtime(format!("Failed to set signal handler: {}", e)))?;

    runtime.block_on(download(
        &config,
        manifest,
        &output_dir,
        concurrency,
        args.dry_run,
        &cancel,
    ))
}

async fn download(
    config: &ConfigFile,
    manifest: Manifest,
    output_dir: &Path,
    concurrency: usize,
    dry_run: bool,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let gallery = GalleryClient::new(config.endpoints())?
        .with_timeout(config.timeout())
        .with_retry_policy(config.retry_policy())
        .with_version_order(config.gallery.version_order);

    let fallback_policy = FallbackPolicy::default();
    let targets = tokio::select! {
        _ = cancel.cancelled() => return Err(CliError::Interrupted),
        targets = resolve_all(&gallery, manifest.extensions(), &fallback_policy) => targets?,
    };

    if targets.is_empty() {
        tracing::warn!("no download targets resolved");
        return Ok(());
    }

    print_plan(&targets);
    if dry_run {
        return Ok(());
    }

    let progress = DownloadProgress::new(targets.len());
    let fetcher = Arc::new(HttpFetcher::new(config.endpoints())?);
    let engine = FetchEngine::new(fetcher)
        .with_concurrency(concurrency)
        .with_progress(progress.callback());

    let result = engine.fetch_all(targets, output_dir, cancel).await;
    progress.finish();
    let summary = result?;

    println!();
    println!(
        "{} {} file(s), {} to {}",
        style("Downloaded").green().bold(),
        summary.file_count(),
        HumanBytes(summary.total_bytes),
        output_dir.display()
    );
    Ok(())
}

fn print_plan(targets: &[Target]) {
    println!(
        "{} ({} file(s)):",
        style("Download plan").bold(),
        targets.len()
    );
    for target in targets {
        println!("  {}", target.filename());
    }
    println!();
}
