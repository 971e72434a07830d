//! Per-operation outcomes
//!
//! Every send or get produces exactly one [`FeedResult`]; failures are
//! carried as values and never raised out of the client.

use std::time::Duration;

use serde::Serialize;

use crate::document::DocumentId;
use crate::errors::FeedError;
use crate::impl_enum_string_conversions;

/// Semantic classification of an operation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// The operation was applied (HTTP 200).
    Success,
    /// A test-and-set condition was not met (HTTP 412).
    ConditionNotMet,
    /// The serving cluster failed internally (HTTP 502, 504 or 507).
    ClusterFailure,
    /// Transport-level failure, or any other HTTP status.
    TransportFailure,
}

impl_enum_string_conversions!(Status {
    Success => "success",
    ConditionNotMet => "condition-not-met",
    ClusterFailure => "cluster-failure",
    TransportFailure => "transport-failure",
});

/// The outcome of a single document operation.
#[derive(Debug, Clone)]
pub struct FeedResult {
    pub id: DocumentId,
    pub status: Status,
    /// Numeric HTTP status, 0 when the transport failed before a response.
    pub http_status: u16,
    pub err: Option<FeedError>,
    /// Response payload; populated on failure and on reads.
    pub body: Vec<u8>,
    /// Verbatim server trace, when tracing was requested and succeeded.
    pub trace: Option<String>,
    /// Wall-clock time from submission until the response was drained.
    pub latency: Duration,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

impl FeedResult {
    /// A fresh result for `id`, before dispatch and classification.
    pub fn new(id: DocumentId) -> Self {
        Self {
            id,
            status: Status::Success,
            http_status: 0,
            err: None,
            body: Vec::new(),
            trace: None,
            latency: Duration::ZERO,
            bytes_sent: 0,
            bytes_recv: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
