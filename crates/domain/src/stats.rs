//! Feeding statistics
//!
//! [`Stats`] accumulates counters over [`FeedResult`] values. It is a plain
//! value type mutated by a single owner; concurrent readers work from
//! snapshots taken with `clone()`.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::result::FeedResult;

/// Running totals over observed feed results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Logical operations initiated, counting retries of the same
    /// operation once.
    pub operations: u64,
    /// Operations whose first attempt was answered with HTTP 200.
    pub successful_operations: u64,
    /// HTTP requests attempted, including retries.
    pub requests: u64,
    /// Transport returns observed, including transport errors.
    pub responses: u64,
    /// Response counts keyed by HTTP status; codes that never occurred are
    /// absent.
    pub responses_by_code: HashMap<u16, u64>,
    #[serde(rename = "totalLatencyMillis", serialize_with = "millis")]
    pub total_latency: Duration,
    #[serde(rename = "minLatencyMillis", serialize_with = "opt_millis")]
    pub min_latency: Option<Duration>,
    #[serde(rename = "maxLatencyMillis", serialize_with = "opt_millis")]
    pub max_latency: Option<Duration>,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

impl Stats {
    /// Fold `result` into the totals.
    ///
    /// With `retried` set the result counts as another request and response
    /// for an operation already recorded, so `operations` (and the
    /// successful-operation count) are left untouched.
    pub fn add(&mut self, result: &FeedResult, retried: bool) {
        if !retried {
            self.operations += 1;
            if result.http_status == 200 {
                self.successful_operations += 1;
            }
        }
        self.requests += 1;
        self.responses += 1;
        if result.http_status > 0 {
            *self.responses_by_code.entry(result.http_status).or_insert(0) += 1;
        }
        self.total_latency += result.latency;
        if result.latency > Duration::ZERO {
            self.min_latency =
                Some(self.min_latency.map_or(result.latency, |min| min.min(result.latency)));
            self.max_latency =
                Some(self.max_latency.map_or(result.latency, |max| max.max(result.latency)));
        }
        self.bytes_sent += result.bytes_sent;
        self.bytes_recv += result.bytes_recv;
    }

    /// Operations that never saw a first-attempt success.
    pub fn unsuccessful(&self) -> u64 {
        self.operations - self.successful_operations
    }
}

fn millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

fn opt_millis<S: Serializer>(
    duration: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match duration {
        Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for stats.
    use super::*;
    use crate::document::DocumentId;
    use crate::result::{FeedResult, Status};

    fn result(http_status: u16, latency: Duration) -> FeedResult {
        let mut result = FeedResult::new(DocumentId::parse("id:ns:music::doc1").unwrap());
        result.http_status = http_status;
        result.status = if http_status == 200 { Status::Success } else { Status::TransportFailure };
        result.latency = latency;
        result
    }

    /// Validates `Stats::add` behavior over a mixed sequence of results.
    ///
    /// Assertions:
    /// - Confirms `operations` excludes the retried result.
    /// - Confirms `requests` and `responses` include every result.
    /// - Confirms latency aggregates and the per-code response counts.
    #[test]
    fn test_add_accumulates_counters() {
        let mut stats = Stats::default();
        stats.add(&result(200, Duration::from_millis(200)), false);
        stats.add(&result(200, Duration::from_millis(400)), false);
        stats.add(&result(200, Duration::from_millis(100)), false);
        stats.add(&result(200, Duration::from_millis(500)), false);
        stats.add(&result(200, Duration::from_millis(300)), false);
        stats.add(&result(500, Duration::from_millis(100)), false);
        stats.add(&result(200, Duration::from_millis(100)), true);

        let expected = Stats {
            operations: 6,
            successful_operations: 5,
            requests: 7,
            responses: 7,
            responses_by_code: HashMap::from([(200, 6), (500, 1)]),
            total_latency: Duration::from_millis(1700),
            min_latency: Some(Duration::from_millis(100)),
            max_latency: Some(Duration::from_millis(500)),
            bytes_sent: 0,
            bytes_recv: 0,
        };
        assert_eq!(stats, expected);
        assert_eq!(stats.unsuccessful(), 1);
    }

    /// Validates `Stats::clone` behavior for the snapshot scenario.
    ///
    /// Assertions:
    /// - Confirms later additions to the source do not appear in the clone.
    #[test]
    fn test_clone_is_a_deep_copy() {
        let mut stats = Stats::default();
        stats.add(&result(200, Duration::ZERO), false);
        let snapshot = stats.clone();
        stats.add(&result(200, Duration::ZERO), false);

        let expected = Stats {
            operations: 1,
            successful_operations: 1,
            requests: 1,
            responses: 1,
            responses_by_code: HashMap::from([(200, 1)]),
            ..Stats::default()
        };
        assert_eq!(snapshot, expected);
        assert_eq!(stats.operations, 2);
    }

    /// Validates `Stats::add` behavior for the transport error scenario.
    ///
    /// Assertions:
    /// - Confirms the response is counted but no status code is recorded.
    #[test]
    fn test_add_transport_error_records_no_code() {
        let mut stats = Stats::default();
        stats.add(&result(0, Duration::from_millis(50)), false);

        assert_eq!(stats.operations, 1);
        assert_eq!(stats.requests, 1);
        assert_eq!(stats.responses, 1);
        assert!(stats.responses_by_code.is_empty());
        assert_eq!(stats.unsuccessful(), 1);
    }

    #[test]
    fn test_add_accumulates_byte_counters() {
        let mut stats = Stats::default();
        let mut first = result(200, Duration::ZERO);
        first.bytes_sent = 100;
        first.bytes_recv = 25;
        let mut second = result(200, Duration::ZERO);
        second.bytes_sent = 40;
        second.bytes_recv = 5;
        stats.add(&first, false);
        stats.add(&second, false);

        assert_eq!(stats.bytes_sent, 140);
        assert_eq!(stats.bytes_recv, 30);
    }

    #[test]
    fn test_retried_success_does_not_count_as_successful_operation() {
        let mut stats = Stats::default();
        stats.add(&result(503, Duration::ZERO), false);
        stats.add(&result(200, Duration::ZERO), true);

        assert_eq!(stats.operations, 1);
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.unsuccessful(), 1);
    }

    #[test]
    fn test_serializes_to_camel_case_summary() {
        let mut stats = Stats::default();
        stats.add(&result(200, Duration::from_millis(120)), false);
        let summary: serde_json::Value = serde_json::to_value(&stats).unwrap();

        assert_eq!(summary["operations"], 1);
        assert_eq!(summary["responsesByCode"]["200"], 1);
        assert_eq!(summary["totalLatencyMillis"], 120);
        assert_eq!(summary["minLatencyMillis"], 120);
        assert_eq!(summary["bytesSent"], 0);
    }
}
