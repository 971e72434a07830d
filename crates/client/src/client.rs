//! Concurrent feed client for the `/document/v1/` API
//!
//! [`Client::send`] queues the document for preparation, dispatches the
//! ready request on the least-busy transport, and classifies the response
//! into a [`FeedResult`]. Failures of any stage are carried in the result;
//! neither `send` nor `get` returns early.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use feedarc_domain::constants::{
    DEFAULT_TRANSPORT_TIMEOUT, PENDING_QUEUE_CAPACITY, TRANSPORT_TIMEOUT_MARGIN,
};
use feedarc_domain::{Compression, Document, DocumentId, FeedError, FeedResult, Status};
use reqwest::Method;
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::debug;
use url::Url;

use crate::clock::{Clock, SystemClock};
use crate::compression::Compressor;
use crate::pool::Pool;
use crate::prepare::{run_preparer, PendingDocument, Prepared};
use crate::transport::{CountingTransport, FeedRequest, FeedResponse, HttpTransport};
use crate::wire::document_url;

/// Configuration of a feed client, captured at construction.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Endpoint that document paths are appended to. Must parse as a
    /// hierarchical URL.
    pub base_url: String,
    /// Server-side request timeout, forwarded as a query parameter. `None`
    /// (or zero) means no explicit timeout.
    pub timeout: Option<Duration>,
    /// Optional routing hint.
    pub route: Option<String>,
    /// Trace verbosity requested from the server; 0 disables tracing.
    pub trace_level: u32,
    pub compression: Compression,
    /// Ask the server to acknowledge without persisting (`dryRun=true`).
    pub speedtest: bool,
    /// Time source for latency accounting.
    pub clock: Arc<dyn Clock>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: None,
            route: None,
            trace_level: 0,
            compression: Compression::default(),
            speedtest: false,
            clock: Arc::new(SystemClock),
        }
    }
}

/// State shared between client handles and preparer workers.
pub(crate) struct ClientCore {
    pub(crate) options: ClientOptions,
    pub(crate) base_url: Url,
    pub(crate) transports: Vec<CountingTransport>,
    pub(crate) send_count: AtomicU64,
    pub(crate) buffers: Pool<Vec<u8>>,
    pub(crate) compressors: Pool<Compressor>,
}

/// Client for the `/document/v1/` API.
///
/// Cheap to clone; clones share the transports, pools and preparer
/// workers. The workers exit once every clone has been dropped.
#[derive(Clone)]
pub struct Client {
    core: Arc<ClientCore>,
    pending_tx: mpsc::Sender<PendingDocument>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    /// Create a feed client over the given transports.
    ///
    /// Spawns one preparer worker per available hardware thread; must be
    /// called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails when `transports` is empty or the base URL does not parse as
    /// a hierarchical URL.
    pub fn new(
        options: ClientOptions,
        transports: Vec<Arc<dyn HttpTransport>>,
    ) -> Result<Self, FeedError> {
        if transports.is_empty() {
            return Err(FeedError::NoTransports);
        }
        let base_url = Url::parse(&options.base_url)
            .map_err(|e| FeedError::InvalidBaseUrl(format!("{}: {e}", options.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(FeedError::InvalidBaseUrl(format!(
                "{}: not a hierarchical url",
                options.base_url
            )));
        }
        let core = Arc::new(ClientCore {
            transports: transports.into_iter().map(CountingTransport::new).collect(),
            options,
            base_url,
            send_count: AtomicU64::new(0),
            buffers: Pool::new(),
            compressors: Pool::new(),
        });
        let (pending_tx, pending_rx) = mpsc::channel(PENDING_QUEUE_CAPACITY);
        let pending_rx = Arc::new(Mutex::new(pending_rx));
        let preparers = std::thread::available_parallelism().map(usize::from).unwrap_or(1);
        for _ in 0..preparers {
            tokio::spawn(run_preparer(Arc::clone(&core), Arc::clone(&pending_rx)));
        }
        Ok(Self { core, pending_tx })
    }

    /// Send `document` to the configured endpoint.
    pub async fn send(&self, document: Document) -> FeedResult {
        let start = self.core.options.clock.now();
        let result = FeedResult::new(document.id.clone());
        let request = match self.prepare(document).await {
            Ok(request) => request,
            Err(err) => return result_with_err(result, err, Duration::ZERO),
        };
        let bytes_sent = request.body.len() as u64;
        let response = self.core.dispatch(&request).await;
        let elapsed = self.core.options.clock.now().saturating_duration_since(start);
        self.core.release_request(request);
        match response {
            Ok(response) => self.core.classify(response, bytes_sent, result, elapsed, false),
            Err(err) => result_with_err(result, err, elapsed),
        }
    }

    /// Retrieve the document with the given id.
    pub async fn get(&self, id: DocumentId) -> FeedResult {
        let start = self.core.options.clock.now();
        let result = FeedResult::new(id.clone());
        let request = match document_url(&self.core.base_url, &id) {
            Ok(url) => FeedRequest::new(Method::GET, url),
            Err(err) => return result_with_err(result, err, Duration::ZERO),
        };
        let response = self.core.dispatch(&request).await;
        let elapsed = self.core.options.clock.now().saturating_duration_since(start);
        match response {
            Ok(response) => self.core.classify(response, 0, result, elapsed, true),
            Err(err) => result_with_err(result, err, elapsed),
        }
    }

    /// Queue the document and wait for a preparer worker to hand back the
    /// ready request. Blocks on admission when the queue is full.
    async fn prepare(&self, document: Document) -> Result<FeedRequest, FeedError> {
        let (tx, rx) = oneshot::channel();
        self.pending_tx
            .send(PendingDocument { document, prepared: tx })
            .await
            .map_err(|_| FeedError::Prepare("preparer workers have shut down".into()))?;
        match rx.await {
            Ok(Prepared { request }) => request,
            Err(_) => Err(FeedError::Prepare("preparer dropped the submission".into())),
        }
    }
}

impl ClientCore {
    /// The timeout handed to the transport: the configured server-side
    /// timeout with 10% headroom plus a fixed margin, or the default when
    /// no timeout is configured.
    fn transport_timeout(&self) -> Duration {
        match self.options.timeout {
            Some(timeout) if !timeout.is_zero() => timeout * 11 / 10 + TRANSPORT_TIMEOUT_MARGIN,
            _ => DEFAULT_TRANSPORT_TIMEOUT,
        }
    }

    /// Pick the transport with the fewest in-flight calls. The scan starts
    /// at a rotating index so that ties spread over equally loaded
    /// transports; the winner's in-flight slot is reserved before return.
    fn least_busy_transport(&self) -> &CountingTransport {
        let next = self.send_count.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let start = (next % self.transports.len() as u64) as usize;
        let mut least_busy = &self.transports[start];
        let mut min = i64::MAX;
        for i in 0..self.transports.len() {
            let j = (i + start) % self.transports.len();
            let inflight = self.transports[j].inflight();
            if inflight < min {
                least_busy = &self.transports[j];
                min = inflight;
            }
        }
        least_busy.reserve();
        least_busy
    }

    async fn dispatch(&self, request: &FeedRequest) -> Result<FeedResponse, FeedError> {
        let timeout = self.transport_timeout();
        debug!(method = %request.method, url = %request.url, ?timeout, "dispatching document request");
        self.least_busy_transport().execute(request, timeout).await
    }

    /// Return the pooled scratch carried by a prepared request.
    pub(crate) fn release_request(&self, request: FeedRequest) {
        if request.gzipped {
            self.buffers.put(request.body);
        }
    }

    fn classify(
        &self,
        response: FeedResponse,
        bytes_sent: u64,
        mut result: FeedResult,
        elapsed: Duration,
        copy_body: bool,
    ) -> FeedResult {
        result.http_status = response.status;
        result.status = match response.status {
            200 => Status::Success,
            412 => Status::ConditionNotMet,
            502 | 504 | 507 => Status::ClusterFailure,
            _ => Status::TransportFailure,
        };
        let body = response.body;
        result.bytes_recv = body.len() as u64;
        if result.is_success() && self.options.trace_level > 0 {
            match extract_trace(&body) {
                Ok(trace) => result.trace = trace,
                Err(err) => {
                    result.status = Status::TransportFailure;
                    result.err = Some(err);
                }
            }
        }
        if !result.is_success() || copy_body {
            result.body = body;
        }
        debug!(status = %result.status, http_status = result.http_status, "document request completed");
        result.latency = elapsed;
        result.bytes_sent = bytes_sent;
        result
    }
}

fn result_with_err(mut result: FeedResult, err: FeedError, elapsed: Duration) -> FeedResult {
    result.status = Status::TransportFailure;
    result.err = Some(err);
    result.latency = elapsed;
    result
}

#[derive(Deserialize)]
struct TraceEnvelope<'a> {
    #[serde(borrow)]
    trace: Option<&'a serde_json::value::RawValue>,
}

/// The verbatim `"trace"` value of a response body, when present.
fn extract_trace(body: &[u8]) -> Result<Option<String>, FeedError> {
    let envelope: TraceEnvelope<'_> =
        serde_json::from_slice(body).map_err(|e| FeedError::Decode(e.to_string()))?;
    Ok(envelope.trace.map(|raw| raw.get().to_string()))
}
