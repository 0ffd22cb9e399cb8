//! Base64 text ↔ raw bytes
//!
//! Standard alphabet, padding required. The speech service returns its audio
//! payload in this form.

use crate::error::DecodeError;
use ::base64::engine::general_purpose::STANDARD;
use ::base64::Engine as _;

/// Decode a base64 string into raw bytes.
///
/// An empty string decodes to an empty byte vector.
///
/// # Errors
/// [`DecodeError::Base64`] if the input contains characters outside the
/// standard alphabet, has a bad length, or has malformed padding.
pub fn decode_base64(input: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(STANDARD.decode(input)?)
}

/// Encode raw bytes as padded standard base64.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
