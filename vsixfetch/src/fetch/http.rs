//! HTTP package downloader.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use reqwest::{Client, Response};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;

use crate::gallery::GalleryEndpoints;
use crate::target::Target;
use crate::{truncate_chars, BoxFuture, MAX_ERROR_BODY_CHARS};

use super::error::FetchError;

/// Timeout for establishing a connection. Transfers themselves are not
/// time-limited since packages can be large.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Buffer size for writing downloads to disk (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Downloads one target into a directory.
///
/// Implementations write `dest_dir/target.filename()` and return the number
/// of bytes written. A failed download must not leave a file behind.
pub trait ArtifactFetcher: Send + Sync + 'static {
    fn fetch<'a>(
        &'a self,
        target: &'a Target,
        dest_dir: &'a Path,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<u64, FetchError>>;
}

/// Fetches packages from the gallery with a single GET each. No retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
    endpoints: GalleryEndpoints,
}

impl HttpFetcher {
    pub fn new(endpoints: GalleryEndpoints) -> Result<Self, FetchError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("vsixfetch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { http, endpoints })
    }

    async fn download(
        &self,
        target: &Target,
        dest_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64, FetchError> {
        let url = target.url(&self.endpoints);
        let filename = target.filename();
        let dest = dest_dir.join(&filename);

        tracing::debug!(
            extension = %target.id(),
            url = %url,
            dest = %dest.display(),
            "Downloading package"
        );

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            response = self.http.get(&url).send() => response.map_err(|source| {
                FetchError::Request {
                    filename: filename.clone(),
                    source,
                }
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = tokio::select! {
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                body = response.text() => body.unwrap_or_default(),
            };
            return Err(FetchError::Status {
                filename,
                status: status.as_u16(),
                body: truncate_chars(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let file = File::create(&dest)
            .await
            .map_err(|source| FetchError::Write {
                path: dest.clone(),
                source,
            })?;

        match stream_to_file(response, file, &filename, &dest, cancel).await {
            Ok(written) => {
                tracing::info!(file = %filename, bytes = written, "Downloaded package");
                Ok(written)
            }
            Err(e) => {
                if let Err(remove_err) = fs::remove_file(&dest).await {
                    tracing::warn!(
                        path = %dest.display(),
                        error = %remove_err,
                        "Failed to remove partial download"
                    );
                }
                Err(e)
            }
        }
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch<'a>(
        &'a self,
        target: &'a Target,
        dest_dir: &'a Path,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<u64, FetchError>> {
        Box::pin(self.download(target, dest_dir, cancel))
    }
}

async fn stream_to_file(
    response: Response,
    file: File,
    filename: &str,
    dest: &Path,
    cancel: &CancellationToken,
) -> Result<u64, FetchError> {
    let write_err = |source| FetchError::Write {
        path: dest.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::with_capacity(BUFFER_SIZE, file);
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            next = stream.next() => next,
        };
        let Some(chunk) = next else {
            break;
        };
        let chunk = chunk.map_err(|source| FetchError::Request {
            filename: filename.to_string(),
            source,
        })?;
        writer.write_all(&chunk).await.map_err(write_err)?;
        written += chunk.len() as u64;
    }

    writer.flush().await.map_err(write_err)?;
    Ok(written)
}
