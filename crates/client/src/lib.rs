//! # FeedArc Client
//!
//! Concurrent HTTP client for the `/document/v1/` API of a FeedArc serving
//! cluster.
//!
//! The client converts logical document operations into wire requests,
//! spreads them over a pool of transports, and returns structured
//! per-operation results with latency and byte accounting.
//!
//! ## Architecture
//! - Request preparation (URL construction and gzip) runs on background
//!   workers fed by a bounded queue; admission blocks when the queue is
//!   full.
//! - Dispatch picks the transport with the fewest in-flight calls, with a
//!   rotating start index to spread equally loaded transports.
//! - All operation failures are carried inside
//!   [`FeedResult`](feedarc_domain::FeedResult) values; `send` and `get`
//!   never fail early.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod client;
pub mod clock;
pub mod compression;
pub mod mock;
pub mod pool;
pub mod transport;

mod prepare;
mod wire;

// Re-export commonly used items
pub use client::{Client, ClientOptions};
pub use clock::{Clock, MockClock, SystemClock};
pub use compression::Compressor;
pub use mock::{MockResponse, MockTransport};
pub use pool::{Pool, Reset};
pub use transport::{FeedRequest, FeedResponse, HttpTransport, ReqwestTransport};
