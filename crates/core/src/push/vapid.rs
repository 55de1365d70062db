//! VAPID application server key handling.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Errors decoding a VAPID public key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VapidKeyError {
    #[error("VAPID public key is missing")]
    Missing,

    #[error("VAPID public key is not valid base64url: {0}")]
    InvalidEncoding(String),
}

/// Convert base64url text into raw bytes.
///
/// Pads to a multiple of four with `=`, maps the URL-safe alphabet back to
/// the standard one (`-` to `+`, `_` to `/`), then decodes with the standard
/// engine.
pub fn url_base64_to_bytes(input: &str) -> Result<Vec<u8>, VapidKeyError> {
    let padding = (4 - input.len() % 4) % 4;
    let mut standard: String = input
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    standard.extend(std::iter::repeat_n('=', padding));

    STANDARD
        .decode(standard.as_bytes())
        .map_err(|e| VapidKeyError::InvalidEncoding(e.to_string()))
}

/// A decoded VAPID public key, held for the lifetime of a page agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VapidPublicKey {
    encoded: String,
    bytes: Vec<u8>,
}

impl VapidPublicKey {
    /// Decode a key supplied by the hosting page. Blank input is `Missing`.
    pub fn parse(encoded: &str) -> Result<Self, VapidKeyError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(VapidKeyError::Missing);
        }
        let bytes = url_base64_to_bytes(encoded)?;
        Ok(Self { encoded: encoded.to_string(), bytes })
    }

    /// The key as supplied (base64url).
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Raw key bytes, as passed to the push service.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
