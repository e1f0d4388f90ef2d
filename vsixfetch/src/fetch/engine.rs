//! Bounded concurrent download engine.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::target::Target;

use super::error::FetchError;
use super::http::ArtifactFetcher;
use super::progress::{FetchEvent, FetchProgressCallback};

/// Default number of simultaneous downloads.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// A completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub filename: String,
    pub bytes: u64,
}

/// Outcome of a successful [`FetchEngine::fetch_all`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Downloaded files in completion order.
    pub files: Vec<FetchedFile>,
    /// Sum of bytes written.
    pub total_bytes: u64,
}

impl FetchSummary {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Downloads targets with at most `concurrency` transfers in flight.
///
/// A failed download stops new downloads from starting. Downloads already
/// running are allowed to finish, then the first failure (by completion
/// time) is returned. Files already written are kept.
pub struct FetchEngine<F: ArtifactFetcher> {
    fetcher: Arc<F>,
    concurrency: usize,
    progress: Option<FetchProgressCallback>,
}

impl<F: ArtifactFetcher> FetchEngine<F> {
    pub fn new(fetcher: Arc<F>) -> Self {
        Self {
            fetcher,
            concurrency: DEFAULT_CONCURRENCY,
            progress: None,
        }
    }

    /// Set the number of simultaneous downloads (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Receive a [`FetchEvent`] for every download state change.
    pub fn with_progress(mut self, callback: FetchProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Download every target into `dest_dir`, creating it if needed.
    ///
    /// Cancelling `cancel` aborts running downloads and keeps queued ones
    /// from starting; the run then fails with [`FetchError::Cancelled`].
    pub async fn fetch_all(
        &self,
        targets: Vec<Target>,
        dest_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<FetchSummary, FetchError> {
        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|source| FetchError::CreateDir {
                path: dest_dir.to_path_buf(),
                source,
            })?;

        let total = targets.len();
        tracing::info!(
            targets = total,
            concurrency = self.concurrency,
            dest = %dest_dir.display(),
            "Starting downloads"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        // Cancelled on the first failure; stops admission only.
        let halt = CancellationToken::new();
        let completion_seq = Arc::new(AtomicUsize::new(0));
        let dest_dir: Arc<PathBuf> = Arc::new(dest_dir.to_path_buf());
        let mut tasks = JoinSet::new();

        for target in targets {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = halt.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };
            if cancel.is_cancelled() || halt.is_cancelled() {
                break;
            }

            let fetcher = Arc::clone(&self.fetcher);
            let progress = self.progress.clone();
            let dest_dir = Arc::clone(&dest_dir);
            let cancel = cancel.clone();
            let halt = halt.clone();
            let completion_seq = Arc::clone(&completion_seq);

            tasks.spawn(async move {
                let _permit = permit;
                let filename = target.filename();
                emit(&progress, FetchEvent::Started {
                    filename: filename.clone(),
                });

                let result = fetcher.fetch(&target, &dest_dir, &cancel).await;
                match &result {
                    Ok(bytes) => emit(&progress, FetchEvent::Finished {
                        filename: filename.clone(),
                        bytes: *bytes,
                    }),
                    Err(e) => {
                        halt.cancel();
                        tracing::warn!(file = %filename, error = %e, "Download failed");
                        emit(&progress, FetchEvent::Failed {
                            filename: filename.clone(),
                            error: e.to_string(),
                        });
                    }
                }

                let seq = completion_seq.fetch_add(1, Ordering::SeqCst);
                (seq, filename, result)
            });
        }

        let mut summary = FetchSummary::default();
        let mut first_error: Option<(usize, FetchError)> = None;
        let mut record_error = |seq: usize, error: FetchError| {
            if first_error.as_ref().map_or(true, |(first, _)| seq < *first) {
                first_error = Some((seq, error));
            }
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, filename, Ok(bytes))) => {
                    summary.total_bytes += bytes;
                    summary.files.push(FetchedFile { filename, bytes });
                }
                Ok((seq, _, Err(e))) => record_error(seq, e),
                Err(join_err) => record_error(usize::MAX, FetchError::Task(join_err.to_string())),
            }
        }

        if let Some((_, error)) = first_error {
            return Err(error);
        }
        if summary.file_count() < total {
            return Err(FetchError::Cancelled);
        }

        tracing::info!(
            files = summary.file_count(),
            bytes = summary.total_bytes,
            "Downloads complete"
        );
        Ok(summary)
    }
}

fn emit(progress: &Option<FetchProgressCallback>, event: FetchEvent) {
    if let Some(callback) = progress {
        callback(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::manifest::ExtensionId;
    use crate::BoxFuture;

    fn target(n: usize) -> Target {
        Target::universal(ExtensionId::new("pub", format!("ext{n}")), "1.0.0")
    }

    fn targets(count: usize) -> Vec<Target> {
        (0..count).map(target).collect()
    }

    /// Fetcher that sleeps instead of downloading and records what ran.
    #[derive(Default)]
    struct MockFetcher {
        delay: Duration,
        delays: HashMap<String, Duration>,
        failures: HashSet<String>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        started: Mutex<Vec<String>>,
        completed: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        fn with_delay(delay: Duration) -> Self {
            Self {
                delay,
                ..Default::default()
            }
        }

        fn failing(mut self, target: &Target) -> Self {
            self.failures.insert(target.filename());
            self
        }

        fn delaying(mut self, target: &Target, delay: Duration) -> Self {
            self.delays.insert(target.filename(), delay);
            self
        }

        fn started(&self) -> Vec<String> {
            self.started.lock().unwrap().clone()
        }

        fn completed(&self) -> Vec<String> {
            self.completed.lock().unwrap().clone()
        }
    }

    impl ArtifactFetcher for MockFetcher {
        fn fetch<'a>(
            &'a self,
            target: &'a Target,
            _dest_dir: &'a Path,
            cancel: &'a CancellationToken,
        ) -> BoxFuture<'a, Result<u64, FetchError>> {
            Box::pin(async move {
                let filename = target.filename();
                self.started.lock().unwrap().push(filename.clone());
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_in_flight.fetch_max(now, Ordering::SeqCst);

                let delay = self.delays.get(&filename).copied().unwrap_or(self.delay);
                let cancelled = tokio::select! {
                    _ = cancel.cancelled() => true,
                    _ = tokio::time::sleep(delay) => false,
                };
                self.in_flight.fetch_sub(1, Ordering::SeqCst);

                if cancelled {
                    return Err(FetchError::Cancelled);
                }
                if self.failures.contains(&filename) {
                    return Err(FetchError::Status {
                        filename,
                        status: 404,
                        body: "missing".to_string(),
                    });
                }
                self.completed.lock().unwrap().push(filename);
                Ok(100)
            })
        }
    }

    fn failed_filename(err: &FetchError) -> &str {
        match err {
            FetchError::Status { filename, .. } => filename,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_all_success() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("out");
        let fetcher = Arc::new(MockFetcher::with_delay(Duration::from_millis(5)));
        let engine = FetchEngine::new(Arc::clone(&fetcher));

        let summary = engine
            .fetch_all(targets(6), &dest, &CancellationToken::new())
            .await
            .unwrap();

        assert!(dest.is_dir());
        assert_eq!(summary.file_count(), 6);
        assert_eq!(summary.total_bytes, 600);
        assert_eq!(fetcher.completed().len(), 6);
    }

    #[tokio::test]
    async fn test_empty_targets() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FetchEngine::new(Arc::new(MockFetcher::default()));
        let summary = engine
            .fetch_all(Vec::new(), dir.path(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(summary, FetchSummary::default());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::with_delay(Duration::from_millis(20)));
        let engine = FetchEngine::new(Arc::clone(&fetcher)).with_concurrency(3);

        engine
            .fetch_all(targets(12), dir.path(), &CancellationToken::new())
            .await
            .unwrap();

        let max = fetcher.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "max in flight was {max}");
        assert!(max >= 1);
    }

    #[test]
    fn test_concurrency_minimum_one() {
        let engine = FetchEngine::new(Arc::new(MockFetcher::default())).with_concurrency(0);
        assert_eq!(engine.concurrency(), 1);
        let engine = FetchEngine::new(Arc::new(MockFetcher::default()));
        assert_eq!(engine.concurrency(), DEFAULT_CONCURRENCY);
    }

    #[tokio::test]
    async fn test_failure_stops_admission() {
        let dir = tempfile::tempdir().unwrap();
        let all = targets(5);
        let fetcher = Arc::new(MockFetcher::with_delay(Duration::from_millis(5)).failing(&all[1]));
        let engine = FetchEngine::new(Arc::clone(&fetcher)).with_concurrency(1);

        let err = engine
            .fetch_all(all.clone(), dir.path(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(failed_filename(&err), all[1].filename());
        assert_eq!(fetcher.started(), vec![all[0].filename(), all[1].filename()]);
        assert_eq!(fetcher.completed(), vec![all[0].filename()]);
    }

    #[tokio::test]
    async fn test_running_downloads_drain_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let all = targets(4);
        let fetcher = Arc::new(
            MockFetcher::with_delay(Duration::from_millis(100))
                .failing(&all[0])
                .delaying(&all[0], Duration::from_millis(5)),
        );
        let engine = FetchEngine::new(Arc::clone(&fetcher)).with_concurrency(2);

        let err = engine
            .fetch_all(all.clone(), dir.path(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(failed_filename(&err), all[0].filename());
        // The sibling already running finished; nothing else started.
        assert_eq!(fetcher.completed(), vec![all[1].filename()]);
        assert_eq!(fetcher.started().len(), 2);
    }

    #[tokio::test]
    async fn test_first_error_by_completion_wins() {
        let dir = tempfile::tempdir().unwrap();
        let all = targets(2);
        let fetcher = Arc::new(
            MockFetcher::default()
                .failing(&all[0])
                .delaying(&all[0], Duration::from_millis(80))
                .failing(&all[1])
                .delaying(&all[1], Duration::from_millis(5)),
        );
        let engine = FetchEngine::new(fetcher).with_concurrency(2);

        let err = engine
            .fetch_all(all.clone(), dir.path(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(failed_filename(&err), all[1].filename());
    }

    #[tokio::test]
    async fn test_pre_cancelled_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::default());
        let engine = FetchEngine::new(Arc::clone(&fetcher));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = engine
            .fetch_all(targets(3), dir.path(), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(fetcher.started().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::with_delay(Duration::from_secs(30)));
        let engine = FetchEngine::new(Arc::clone(&fetcher)).with_concurrency(2);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = tokio::time::timeout(
            Duration::from_secs(5),
            engine.fetch_all(targets(5), dir.path(), &cancel),
        )
        .await
        .expect("cancellation should end the run")
        .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(fetcher.started().len(), 2);
        assert!(fetcher.completed().is_empty());
    }

    #[tokio::test]
    async fn test_progress_events() {
        let dir = tempfile::tempdir().unwrap();
        let all = targets(3);
        let fetcher = Arc::new(MockFetcher::default().failing(&all[2]));
        let events: Arc<Mutex<Vec<FetchEvent>>> = Arc::default();
        let sink = Arc::clone(&events);

        let engine = FetchEngine::new(fetcher)
            .with_concurrency(1)
            .with_progress(Arc::new(move |event: &FetchEvent| {
                sink.lock().unwrap().push(event.clone());
            }));

        let _ = engine
            .fetch_all(all.clone(), dir.path(), &CancellationToken::new())
            .await;

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 6);
        assert_eq!(
            events[0],
            FetchEvent::Started {
                filename: all[0].filename()
            }
        );
        assert_eq!(
            events[1],
            FetchEvent::Finished {
                filename: all[0].filename(),
                bytes: 100
            }
        );
        assert!(matches!(&events[5], FetchEvent::Failed { filename, .. } if *filename == all[2].filename()));
    }
}
