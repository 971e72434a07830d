//! Error types used throughout the feed client

use thiserror::Error;

/// Main error type for feed operations.
///
/// Operation-level failures are carried as values inside
/// [`FeedResult`](crate::result::FeedResult); only client construction
/// surfaces these synchronously.
#[derive(Error, Debug, Clone)]
pub enum FeedError {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    #[error("need at least one transport client")]
    NoTransports,

    #[error("failed to prepare request: {0}")]
    Prepare(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode json response: {0}")]
    Decode(String),

    #[error(transparent)]
    InvalidId(#[from] IdParseError),
}

/// Error type for document id parsing
///
/// Converts into [`FeedError`] transparently, so id parsing composes with
/// the rest of the feed error surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdParseError {
    #[error("invalid document id {0:?}: expected id:<namespace>:<type>:[n=<number>|g=<group>]:<user-specific>")]
    InvalidFormat(String),

    #[error("invalid document id {id:?}: invalid number {value:?}")]
    InvalidNumber { id: String, value: String },

    #[error("invalid document id {0:?}: group must not be empty")]
    EmptyGroup(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for errors.
    use super::*;

    #[test]
    fn test_id_parse_error_converts_transparently() {
        let parse_error = IdParseError::InvalidFormat("garbage".to_string());
        let feed_error = FeedError::from(parse_error.clone());
        assert_eq!(feed_error.to_string(), parse_error.to_string());
    }

    #[test]
    fn test_error_messages_name_the_failing_input() {
        let err = IdParseError::InvalidNumber { id: "id:ns:t:n=x:u".into(), value: "x".into() };
        assert!(err.to_string().contains("id:ns:t:n=x:u"));
        assert!(err.to_string().contains("\"x\""));
    }
}
