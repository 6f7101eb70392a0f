//! Shared wire types for the background generation endpoint.
//!
//! This crate owns the JSON bodies exchanged between the canvas engine (or the
//! CLI) and the server's `POST /api/generate` proxy, plus the `data:` URL codec
//! both sides use to carry image bytes inside JSON.


use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Smallest width or height the provider is asked for.
pub const MIN_DIMENSION: u32 = 512;
/// Largest width or height the provider is asked for.
pub const MAX_DIMENSION: u32 = 2048;
/// Dimension used when the request omits one or sends a non-numeric value.
pub const DEFAULT_DIMENSION: u32 = 1024;

/// Mime type assumed when the provider does not report an image type.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Error returned by [`DataUrl::parse`].
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The string does not start with `data:`.
    #[error("not a data URL")]
    MissingScheme,
    /// The header has no `;base64,` marker.
    #[error("data URL is not base64 encoded")]
    NotBase64,
    /// The payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Body of `POST /api/generate`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Free-text description of the image.
    pub prompt: String,
    /// Requested width in pixels (clamped server-side).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Requested height in pixels (clamped server-side).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Successful response of `POST /api/generate`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated image as a `data:` URL.
    pub image: String,
}

/// Error body returned by every failing endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message, safe to show to the user.
    pub error: String,
}

/// Resolve a raw JSON dimension into the range accepted by the provider.
///
/// Numbers and numeric strings are accepted. Absent, zero, non-finite and
/// non-numeric values fall back to [`DEFAULT_DIMENSION`]. The result is
/// rounded and clamped to `[MIN_DIMENSION, MAX_DIMENSION]`.
#[must_use]
pub fn resolve_dimension(raw: Option<&Value>) -> u32 {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let value = match parsed {
        Some(v) if v.is_finite() && v != 0.0 => v,
        _ => f64::from(DEFAULT_DIMENSION),
    };
    let clamped = value
        .round()
        .clamp(f64::from(MIN_DIMENSION), f64::from(MAX_DIMENSION));
    // Clamped into [512, 2048] above, so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let resolved = clamped as u32;
    resolved
}

/// A decoded `data:<mime>;base64,<payload>` URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataUrl {
    /// Mime type from the header, e.g. `image/png`.
    pub mime: String,
    /// Decoded payload bytes.
    pub bytes: Vec<u8>,
}

impl DataUrl {
    #[must_use]
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { mime: mime.into(), bytes }
    }

    /// Encode `bytes` as a base64 `data:` URL without building a `DataUrl`.
    #[must_use]
    pub fn encode(mime: &str, bytes: &[u8]) -> String {
        format!("data:{mime};base64,{}", STANDARD.encode(bytes))
    }

    /// Parse a base64 `data:` URL.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::MissingScheme`] when the prefix is absent,
    /// [`WireError::NotBase64`] for non-base64 data URLs, and
    /// [`WireError::Decode`] when the payload is malformed.
    pub fn parse(url: &str) -> Result<Self, WireError> {
        let rest = url.strip_prefix("data:").ok_or(WireError::MissingScheme)?;
        let (header, payload) = rest.split_once(',').ok_or(WireError::NotBase64)?;
        let mime = header.strip_suffix(";base64").ok_or(WireError::NotBase64)?;
        let bytes = STANDARD.decode(payload.trim())?;
        Ok(Self { mime: mime.to_owned(), bytes })
    }

    /// File extension matching the mime type, used when writing to disk.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "jpg",
        }
    }
}

impl std::fmt::Display for DataUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&Self::encode(&self.mime, &self.bytes))
    }
}
