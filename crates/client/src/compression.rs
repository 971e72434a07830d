//! Gzip compression for request bodies
//!
//! Compression is decided per request from the configured
//! [`Compression`](feedarc_domain::Compression) policy and the body size,
//! and writes into a pooled scratch buffer.

use std::io::Write;

use feedarc_domain::constants::AUTO_GZIP_MIN_BODY_BYTES;
use feedarc_domain::{Compression, FeedError};
use flate2::write::GzEncoder;

use crate::pool::Reset;

/// Whether a body of `len` bytes should be gzipped under `compression`.
pub(crate) fn should_compress(compression: Compression, len: usize) -> bool {
    match compression {
        Compression::None => false,
        Compression::Gzip => len > 0,
        Compression::Auto => len > AUTO_GZIP_MIN_BODY_BYTES,
    }
}

/// Reusable gzip compressor.
///
/// The item holds the configured compression level; the deflate stream is
/// rebuilt per body over the caller's output buffer.
#[derive(Debug)]
pub struct Compressor {
    level: flate2::Compression,
}

impl Default for Compressor {
    fn default() -> Self {
        Self { level: flate2::Compression::default() }
    }
}

impl Compressor {
    /// Gzip `body` into `out`, replacing its contents.
    pub fn compress_into(&mut self, body: &[u8], out: &mut Vec<u8>) -> Result<(), FeedError> {
        out.clear();
        out.reserve(body.len().min(1024));
        let mut encoder = GzEncoder::new(std::mem::take(out), self.level);
        encoder
            .write_all(body)
            .map_err(|e| FeedError::Prepare(format!("gzip compression failed: {e}")))?;
        *out = encoder
            .finish()
            .map_err(|e| FeedError::Prepare(format!("gzip finalization failed: {e}")))?;
        Ok(())
    }
}

impl Reset for Compressor {
    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    //! Unit tests for compression.
    use std::io::Read;

    use flate2::read::GzDecoder;

    use super::*;

    /// Validates `Compressor::compress_into` behavior for the round trip
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the compressed bytes decode back to the original body.
    /// - Ensures repetitive input actually shrinks.
    #[test]
    fn test_compress_into_round_trips() {
        let mut compressor = Compressor::default();
        let body = b"a repetitive payload that should compress well ".repeat(20);
        let mut out = Vec::new();

        compressor.compress_into(&body, &mut out).unwrap();
        assert!(out.len() < body.len());

        let mut decoded = Vec::new();
        GzDecoder::new(out.as_slice()).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, body);
    }

    /// Validates `Compressor::compress_into` behavior for the reuse
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms a second compression replaces the buffer contents.
    #[test]
    fn test_compress_into_replaces_previous_output() {
        let mut compressor = Compressor::default();
        let mut out = Vec::new();
        compressor.compress_into(b"first body", &mut out).unwrap();
        compressor.compress_into(b"second", &mut out).unwrap();

        let mut decoded = Vec::new();
        GzDecoder::new(out.as_slice()).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, b"second");
    }

    #[test]
    fn test_should_compress_none_never_compresses() {
        assert!(!should_compress(Compression::None, 0));
        assert!(!should_compress(Compression::None, 1 << 20));
    }

    #[test]
    fn test_should_compress_gzip_compresses_any_nonempty_body() {
        assert!(!should_compress(Compression::Gzip, 0));
        assert!(should_compress(Compression::Gzip, 1));
    }

    #[test]
    fn test_should_compress_auto_uses_size_threshold() {
        assert!(!should_compress(Compression::Auto, AUTO_GZIP_MIN_BODY_BYTES));
        assert!(should_compress(Compression::Auto, AUTO_GZIP_MIN_BODY_BYTES + 1));
    }
}
