//! Integration tests for `HttpFetcher` and `FetchEngine`.
//!
//! These tests download from an `httpmock` server and check what ends up on
//! disk:
//! - successful downloads are written under the target filename
//! - non-2xx answers leave no file and do not disturb siblings
//! - broken transfers remove the partial file
//!
//! Run with: `cargo test --test fetch_integration`

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::GET;
use httpmock::{Mock, MockServer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use vsixfetch::fetch::ArtifactFetcher;
use vsixfetch::{ExtensionId, FetchEngine, FetchError, GalleryEndpoints, HttpFetcher, Platform, Target};

// ============================================================================
// Helper Functions
// ============================================================================

fn fetcher_for(base_url: &str) -> HttpFetcher {
    HttpFetcher::new(GalleryEndpoints::new(
        format!("{base_url}/extensionquery"),
        base_url,
    ))
    .unwrap()
}

fn fetcher(server: &MockServer) -> HttpFetcher {
    fetcher_for(&server.base_url())
}

fn target(name: &str) -> Target {
    Target::universal(ExtensionId::new("acme", name), "1.0.0")
}

fn package_path(name: &str) -> String {
    format!("/publishers/acme/vsextensions/{name}/1.0.0/vspackage")
}

/// Serve `body` for the universal package of `name`.
async fn serve_package<'a>(
    server: &'a MockServer,
    name: &str,
    status: u16,
    body: impl AsRef<[u8]>,
    delay: Duration,
) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(GET).path(package_path(name));
            then.status(status).body(body).delay(delay);
        })
        .await
}

/// Accept one connection, advertise `claimed_len` bytes, send only `body`
/// and hang up. Returns the base URL.
async fn serve_truncated(body: Vec<u8>, claimed_len: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }

        let reply = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {claimed_len}\r\nConnection: close\r\n\r\n"
        );
        let _ = stream.write_all(reply.as_bytes()).await;
        let _ = stream.write_all(&body).await;
        let _ = stream.shutdown().await;
    });

    format!("http://{addr}")
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ============================================================================
// HttpFetcher
// ============================================================================

#[tokio::test]
async fn test_download_writes_file() {
    let server = MockServer::start_async().await;
    let payload = vec![7u8; 200 * 1024];
    let mock = serve_package(&server, "tool", 200, payload.clone(), Duration::ZERO).await;

    let dir = tempfile::tempdir().unwrap();
    let written = fetcher(&server)
        .fetch(&target("tool"), dir.path(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(written, payload.len() as u64);
    assert_eq!(std::fs::read(dir.path().join("acme.tool-1.0.0.vsix")).unwrap(), payload);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_platform_download_uses_query_string() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(package_path("tool"))
                .query_param("targetPlatform", "win32-arm64");
            then.status(200).body("arm build");
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = Target::for_platform(
        ExtensionId::new("acme", "tool"),
        "1.0.0",
        Platform::from("win32-arm64"),
    );
    fetcher(&server)
        .fetch(&target, dir.path(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(files_in(dir.path()), ["acme.tool-1.0.0@win32-arm64.vsix"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_creates_no_file() {
    let server = MockServer::start_async().await;
    serve_package(&server, "gone", 404, "x".repeat(500), Duration::ZERO).await;

    let dir = tempfile::tempdir().unwrap();
    let err = fetcher(&server)
        .fetch(&target("gone"), dir.path(), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        FetchError::Status {
            filename,
            status,
            body,
        } => {
            assert_eq!(filename, "acme.gone-1.0.0.vsix");
            assert_eq!(status, 404);
            assert_eq!(body, format!("{}...", "x".repeat(200)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn test_broken_transfer_removes_partial_file() {
    let base_url = serve_truncated(vec![1u8; 1024], 64 * 1024).await;

    let dir = tempfile::tempdir().unwrap();
    let err = fetcher_for(&base_url)
        .fetch(&target("broken"), dir.path(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Request { .. }), "got {err}");
    assert!(files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn test_cancel_aborts_slow_download() {
    let server = MockServer::start_async().await;
    serve_package(&server, "slow", 200, "late", Duration::from_secs(10)).await;

    let dir = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let fetcher = fetcher(&server);
    let err = tokio::time::timeout(
        Duration::from_secs(5),
        fetcher.fetch(&target("slow"), dir.path(), &cancel),
    )
    .await
    .expect("cancellation should end the download")
    .unwrap_err();

    assert!(err.is_cancelled());
    assert!(files_in(dir.path()).is_empty());
}

// ============================================================================
// FetchEngine over HTTP
// ============================================================================

#[tokio::test]
async fn test_failure_leaves_siblings_intact() {
    let server = MockServer::start_async().await;
    let good = serve_package(&server, "good", 200, "good", Duration::from_millis(100)).await;
    serve_package(&server, "bad", 500, "server error", Duration::ZERO).await;

    let dir = tempfile::tempdir().unwrap();
    let engine = FetchEngine::new(Arc::new(fetcher(&server))).with_concurrency(2);
    let err = engine
        .fetch_all(
            vec![target("good"), target("bad")],
            dir.path(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 500, .. }));
    // The running sibling drained and kept its file.
    assert_eq!(files_in(dir.path()), ["acme.good-1.0.0.vsix"]);
    good.assert_async().await;
}

#[tokio::test]
async fn test_engine_downloads_every_target_once() {
    let server = MockServer::start_async().await;
    let names: Vec<String> = (0..8).map(|i| format!("pkg{i}")).collect();
    let mut mocks = Vec::new();
    for name in &names {
        mocks.push(serve_package(&server, name, 200, name.clone(), Duration::from_millis(50)).await);
    }

    let dir = tempfile::tempdir().unwrap();
    let engine = FetchEngine::new(Arc::new(fetcher(&server))).with_concurrency(3);
    let summary = engine
        .fetch_all(
            names.iter().map(|n| target(n)).collect(),
            dir.path(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.file_count(), 8);
    assert_eq!(files_in(dir.path()).len(), 8);
    for mock in &mocks {
        mock.assert_hits_async(1).await;
    }
}

#[tokio::test]
async fn test_engine_creates_output_dir() {
    let server = MockServer::start_async().await;
    serve_package(&server, "tool", 200, "data", Duration::ZERO).await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("a").join("b");
    let engine = FetchEngine::new(Arc::new(fetcher(&server)));
    engine
        .fetch_all(vec![target("tool")], &out, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(files_in(&out), ["acme.tool-1.0.0.vsix"]);
}
