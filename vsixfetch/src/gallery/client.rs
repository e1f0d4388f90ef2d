//! Gallery query client.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;

use crate::manifest::ExtensionId;
use crate::{truncate_chars, BoxFuture, MAX_ERROR_BODY_CHARS};

use super::endpoints::GalleryEndpoints;
use super::error::{GalleryError, GalleryResult, TransportError};
use super::ordering::VersionOrder;
use super::result::QueryResult;
use super::retry::RetryPolicy;
use super::types::{QueryRequest, QueryResponse};

/// Gallery API version requested in the `Accept` header.
pub const API_VERSION: &str = "7.1-preview.1";

/// Default timeout for a single query request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Looks up the published versions of an extension.
///
/// Implemented by [`GalleryClient`]; the resolver pipeline only depends on
/// this trait so it can run against an in-memory catalogue in tests.
pub trait PackageQuery: Send + Sync {
    /// Query one extension.
    ///
    /// `want_all_versions` asks for the full version history (needed to find
    /// a pinned version); otherwise only the latest build per platform is
    /// returned.
    fn query<'a>(
        &'a self,
        id: &'a ExtensionId,
        want_all_versions: bool,
    ) -> BoxFuture<'a, GalleryResult<QueryResult>>;
}

/// HTTP client for the marketplace `extensionquery` endpoint.
///
/// # Example
///
/// ```ignore
/// let client = GalleryClient::new(GalleryEndpoints::default())?
///     .with_version_order(VersionOrder::Semver);
/// let result = client.query_extension(&"ms-python.python".parse()?, false).await?;
/// ```
pub struct GalleryClient {
    http: Client,
    endpoints: GalleryEndpoints,
    retry: RetryPolicy,
    order: VersionOrder,
    timeout: Duration,
}

impl GalleryClient {
    /// Create a client with the default timeout, retry policy and ordering.
    pub fn new(endpoints: GalleryEndpoints) -> GalleryResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("vsixfetch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GalleryError::Client)?;

        Ok(Self {
            http,
            endpoints,
            retry: RetryPolicy::default(),
            order: VersionOrder::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set how version entries are ordered.
    pub fn with_version_order(mut self, order: VersionOrder) -> Self {
        self.order = order;
        self
    }

    /// Endpoints this client talks to.
    pub fn endpoints(&self) -> &GalleryEndpoints {
        &self.endpoints
    }

    /// Query one extension, retrying failures according to the policy.
    pub async fn query_extension(
        &self,
        id: &ExtensionId,
        want_all_versions: bool,
    ) -> GalleryResult<QueryResult> {
        let id_str = id.to_string();
        let request = QueryRequest::for_extension(&id_str, want_all_versions);
        let body = serde_json::to_vec(&request).map_err(|e| GalleryError::Query {
            id: id_str.clone(),
            source: TransportError::Json(e),
        })?;

        tracing::debug!(
            extension = %id,
            flags = request.flags,
            url = %self.endpoints.query_url,
            "Querying gallery"
        );

        let response = self
            .post_with_retry(&id_str, &body)
            .await
            .map_err(|source| GalleryError::Query {
                id: id_str.clone(),
                source,
            })?;

        let record = response
            .into_first_extension()
            .ok_or(GalleryError::NotFound { id: id_str })?;

        let mut result = QueryResult::from(record);
        self.order.apply(&mut result.versions);

        tracing::debug!(
            extension = %id,
            versions = result.versions.len(),
            "Gallery query complete"
        );

        Ok(result)
    }

    async fn post_with_retry(
        &self,
        id: &str,
        body: &[u8],
    ) -> Result<QueryResponse, TransportError> {
        let mut failed_attempts = 0u32;

        loop {
            let error = match self.post_once(body).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };
            failed_attempts += 1;

            let delay = if self.retry.scope.should_retry(&error) {
                self.retry.delay_for_attempt(failed_attempts)
            } else {
                None
            };

            let Some(wait) = delay else {
                return Err(error);
            };

            tracing::warn!(
                extension = id,
                attempt = failed_attempts,
                max_attempts = self.retry.max_attempts(),
                url = %self.endpoints.query_url,
                error = %error,
                wait_ms = wait.as_millis() as u64,
                "Gallery query failed, retrying"
            );
            tokio::time::sleep(wait).await;
        }
    }

    async fn post_once(&self, body: &[u8]) -> Result<QueryResponse, TransportError> {
        let response = self
            .http
            .post(&self.endpoints.query_url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, format!("application/json;api-version={API_VERSION}"))
            .body(body.to_vec())
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate_chars(&String::from_utf8_lossy(&bytes), MAX_ERROR_BODY_CHARS),
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl PackageQuery for GalleryClient {
    fn query<'a>(
        &'a self,
        id: &'a ExtensionId,
        want_all_versions: bool,
    ) -> BoxFuture<'a, GalleryResult<QueryResult>> {
        Box::pin(self.query_extension(id, want_all_versions))
    }
}
