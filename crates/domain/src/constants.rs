//! Domain constants
//!
//! Centralized location for the wire-contract and tuning constants used by
//! the feed client.

use std::time::Duration;

// Request preparation
pub const AUTO_GZIP_MIN_BODY_BYTES: usize = 512;
pub const PENDING_QUEUE_CAPACITY: usize = 4096;

// Transport timeouts. The configured request timeout is forwarded to the
// server; the transport itself gets 10% headroom plus this fixed margin so
// client-side cancellation does not race a server response.
pub const TRANSPORT_TIMEOUT_MARGIN: Duration = Duration::from_secs(1);
pub const DEFAULT_TRANSPORT_TIMEOUT: Duration = Duration::from_secs(190);
