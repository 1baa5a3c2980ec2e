//! Compact text codec for serialized payloads.
//!
//! `encode` deflates the UTF-8 bytes with zlib framing and base64-encodes
//! the result; `decode` reverses it. The strict [`try_encode`] and
//! [`try_decode`] report failures. [`encode`] and [`decode`] fail open:
//! they log the failure and hand the input back unchanged, so callers
//! must tolerate receiving the original text.

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::CodecError;

/// Compresses and base64-encodes `text`.
pub fn try_encode(text: &str) -> Result<String, CodecError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(text.as_bytes())
        .map_err(CodecError::Deflate)?;
    let compressed = encoder.finish().map_err(CodecError::Deflate)?;
    Ok(STANDARD.encode(compressed))
}

/// Reverses [`try_encode`].
pub fn try_decode(encoded: &str) -> Result<String, CodecError> {
    let compressed = STANDARD.decode(encoded.trim())?;
    let mut inflated = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut inflated)
        .map_err(CodecError::Inflate)?;
    Ok(String::from_utf8(inflated)?)
}

/// Fail-open [`try_encode`]: returns `text` unchanged on failure.
pub fn encode(text: &str) -> String {
    match try_encode(text) {
        Ok(encoded) => encoded,
        Err(err) => {
            tracing::warn!(error = %err, "compression failed, passing data through");
            text.to_string()
        }
    }
}

/// Fail-open [`try_decode`]: returns `encoded` unchanged on failure.
pub fn decode(encoded: &str) -> String {
    match try_decode(encoded) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(error = %err, "decompression failed, passing data through");
            encoded.to_string()
        }
    }
}
