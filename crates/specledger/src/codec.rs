//! Compression codec for stored payloads.
//!
//! Payloads are JSON-encoded and deflated (zlib) before they cross the
//! persistence boundary, and inflated immediately after retrieval. Whether
//! the bytes decode to a full snapshot or to a delta is decided by the
//! record's `is_full` flag, not by the payload itself.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde_json::Value;
use specledger_diff::Delta;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("deflate: {0}")]
    Deflate(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Deflate raw bytes.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Inflate raw bytes. Fails on any corruption of the stored stream.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    ZlibDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}

/// Encode a full document snapshot for storage.
pub fn encode_full(doc: &Value) -> Result<Vec<u8>, CodecError> {
    compress(&serde_json::to_vec(doc)?)
}

/// Encode a delta for storage.
pub fn encode_delta(delta: &Delta) -> Result<Vec<u8>, CodecError> {
    compress(&serde_json::to_vec(delta)?)
}

/// Decode a stored payload as a full document snapshot.
pub fn decode_full(bytes: &[u8]) -> Result<Value, CodecError> {
    Ok(serde_json::from_slice(&decompress(bytes)?)?)
}

/// Decode a stored payload as a delta.
pub fn decode_delta(bytes: &[u8]) -> Result<Delta, CodecError> {
    Ok(serde_json::from_slice(&decompress(bytes)?)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────
