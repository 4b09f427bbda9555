//! Base45 wire encoding.
//!
//! Raw frames travel as base45 text so QR codes can use alphanumeric mode,
//! which packs roughly 45% more data per module than byte mode.

use crate::error::{AirgapError, Result};

pub fn encode(bytes: &[u8]) -> String {
    base45::encode(bytes)
}

/// Decodes a base45 string back to raw frame bytes. Any character outside
/// the base45 alphabet, or a malformed trailing group, is an encoding error.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    base45::decode(text).map_err(|_| AirgapError::Encoding)
}
