//! Transport seam for the feed client
//!
//! The client treats HTTP transports as opaque: anything that can execute a
//! prepared request within a timeout. Transports own connection pooling,
//! TLS and authentication. The production implementation is backed by
//! reqwest; tests use [`MockTransport`](crate::mock::MockTransport).

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use feedarc_domain::FeedError;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::Method;
use url::Url;

/// A prepared HTTP request for one document operation.
#[derive(Debug, Clone)]
pub struct FeedRequest {
    pub method: Method,
    pub url: Url,
    /// Request payload; empty means no body is sent.
    pub body: Vec<u8>,
    /// True when `body` holds gzip-compressed bytes, in which case the
    /// transport must send `Content-Encoding: gzip`.
    pub gzipped: bool,
}

impl FeedRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, body: Vec::new(), gzipped: false }
    }
}

/// A response surfaced by a transport, with the body fully drained.
#[derive(Debug, Clone, Default)]
pub struct FeedResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Opaque HTTP transport executing prepared requests.
///
/// Implementations drain the response body before returning, so `timeout`
/// covers the full request/response exchange.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(
        &self,
        request: &FeedRequest,
        timeout: Duration,
    ) -> Result<FeedResponse, FeedError>;
}

/// Transport wrapper carrying the in-flight counter used by least-busy
/// dispatch.
pub(crate) struct CountingTransport {
    inner: Arc<dyn HttpTransport>,
    inflight: AtomicI64,
}

struct InflightGuard<'a>(&'a AtomicI64);

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl CountingTransport {
    pub(crate) fn new(inner: Arc<dyn HttpTransport>) -> Self {
        Self { inner, inflight: AtomicI64::new(0) }
    }

    pub(crate) fn inflight(&self) -> i64 {
        self.inflight.load(Ordering::Relaxed)
    }

    /// Reserve an in-flight slot. Done by the dispatcher at selection time,
    /// before the call itself starts.
    pub(crate) fn reserve(&self) {
        self.inflight.fetch_add(1, Ordering::Relaxed);
    }

    /// Execute on the wrapped transport, releasing the reserved slot when
    /// the call returns or is dropped.
    pub(crate) async fn execute(
        &self,
        request: &FeedRequest,
        timeout: Duration,
    ) -> Result<FeedResponse, FeedError> {
        let _guard = InflightGuard(&self.inflight);
        self.inner.execute(request, timeout).await
    }
}

/// Production transport backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default reqwest client.
    ///
    /// # Errors
    ///
    /// Fails when the underlying TLS backend cannot be initialized.
    pub fn new() -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FeedError::Transport(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an externally configured reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: &FeedRequest,
        timeout: Duration,
    ) -> Result<FeedResponse, FeedError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .timeout(timeout);
        if !request.body.is_empty() {
            builder = builder.header(CONTENT_TYPE, "application/json; charset=utf-8");
            if request.gzipped {
                builder = builder.header(CONTENT_ENCODING, "gzip");
            }
            builder = builder.body(request.body.clone());
        }
        let response = builder
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Transport(format!("failed to read response body: {e}")))?;
        Ok(FeedResponse { status, body: body.to_vec() })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for transport.
    use super::*;
    use crate::mock::MockTransport;

    fn request() -> FeedRequest {
        FeedRequest::new(Method::GET, Url::parse("http://localhost/document/v1/ns/t/docid/d").unwrap())
    }

    #[tokio::test]
    async fn test_counting_transport_balances_reserve_and_release() {
        let transport = CountingTransport::new(Arc::new(MockTransport::new()));
        assert_eq!(transport.inflight(), 0);

        transport.reserve();
        assert_eq!(transport.inflight(), 1);

        transport.execute(&request(), Duration::from_secs(1)).await.unwrap();
        assert_eq!(transport.inflight(), 0);
    }

    #[tokio::test]
    async fn test_counting_transport_releases_on_error() {
        let mock = Arc::new(MockTransport::new());
        mock.push_error(FeedError::Transport("connection refused".into()));
        let transport = CountingTransport::new(mock);

        transport.reserve();
        let result = transport.execute(&request(), Duration::from_secs(1)).await;
        assert!(result.is_err());
        assert_eq!(transport.inflight(), 0);
    }
}
