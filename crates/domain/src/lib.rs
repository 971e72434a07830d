//! # FeedArc Domain
//!
//! Business domain types for the FeedArc document feed client.
//!
//! This crate contains:
//! - The document model ([`Document`], [`DocumentId`], [`Operation`])
//! - Per-operation outcomes ([`FeedResult`], [`Status`])
//! - Feeding statistics ([`Stats`])
//! - Domain error types and constants
//!
//! ## Architecture
//! - No dependencies on other FeedArc crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod constants;
pub mod document;
pub mod errors;
pub mod macros;
pub mod result;
pub mod stats;

// Re-export commonly used items
pub use document::{Compression, Document, DocumentId, Operation};
pub use errors::{FeedError, IdParseError};
pub use result::{FeedResult, Status};
pub use stats::Stats;
