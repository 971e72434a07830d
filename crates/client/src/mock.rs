//! Scriptable transport for exercising the client without a network
//!
//! Responses and errors are consumed in FIFO order; queued errors are
//! returned before any queued response. Every request (and the timeout it
//! was given) is recorded for inspection. With nothing queued the transport
//! answers 200 with an empty body.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use feedarc_domain::FeedError;

use crate::transport::{FeedRequest, FeedResponse, HttpTransport};

/// A scripted response for a [`MockTransport`].
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Transport test double returning queued responses.
#[derive(Debug, Default)]
pub struct MockTransport {
    next_responses: Mutex<VecDeque<MockResponse>>,
    next_errors: Mutex<VecDeque<FeedError>>,
    requests: Mutex<Vec<FeedRequest>>,
    last_timeout: Mutex<Option<Duration>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and an empty body.
    pub fn push_status(&self, status: u16) {
        self.push_response(status, Vec::new());
    }

    /// Queue a response with the given status and body.
    pub fn push_response(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.next_responses
            .lock()
            .expect("mutex poisoned")
            .push_back(MockResponse { status, body: body.into() });
    }

    /// Queue a transport error, returned before any queued response.
    pub fn push_error(&self, err: FeedError) {
        self.next_errors.lock().expect("mutex poisoned").push_back(err);
    }

    /// All requests executed through this transport, in order.
    pub fn requests(&self) -> Vec<FeedRequest> {
        self.requests.lock().expect("mutex poisoned").clone()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<FeedRequest> {
        self.requests.lock().expect("mutex poisoned").last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("mutex poisoned").len()
    }

    /// The timeout handed to the most recent execution.
    pub fn last_timeout(&self) -> Option<Duration> {
        *self.last_timeout.lock().expect("mutex poisoned")
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(
        &self,
        request: &FeedRequest,
        timeout: Duration,
    ) -> Result<FeedResponse, FeedError> {
        self.requests.lock().expect("mutex poisoned").push(request.clone());
        *self.last_timeout.lock().expect("mutex poisoned") = Some(timeout);
        if let Some(err) = self.next_errors.lock().expect("mutex poisoned").pop_front() {
            return Err(err);
        }
        let response = self
            .next_responses
            .lock()
            .expect("mutex poisoned")
            .pop_front()
            .unwrap_or(MockResponse { status: 200, body: Vec::new() });
        Ok(FeedResponse { status: response.status, body: response.body })
    }
}
