//! Image generation: the provider seam and its errors.
//!
//! DESIGN
//! ======
//! Handlers depend on the [`ImageProvider`] trait, never on a concrete HTTP
//! client, so route tests can substitute a recording mock. The only real
//! provider is [`pollinations::PollinationsClient`].

pub mod pollinations;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use studio_wire::{DEFAULT_IMAGE_MIME, DataUrl};

use crate::error::ErrorCode;

/// A validated generation request. Dimensions are already clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
}

/// Raw image bytes as returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// The provider's `Content-Type`, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl GeneratedImage {
    /// Mime type for the data URL: the provider's type when it is an image
    /// type, otherwise JPEG.
    #[must_use]
    pub fn mime(&self) -> &str {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(str::trim)
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or(DEFAULT_IMAGE_MIME)
    }

    #[must_use]
    pub fn to_data_url(&self) -> String {
        DataUrl::encode(self.mime(), &self.bytes)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The provider base URL cannot carry a path.
    #[error("invalid provider URL: {0}")]
    InvalidUrl(String),

    /// The HTTP request to the provider failed.
    #[error("provider request failed: {0}")]
    Request(String),

    /// The provider returned a non-success HTTP status.
    #[error("provider returned status {status}")]
    Status { status: u16 },

    /// The response body could not be read.
    #[error("provider body read failed: {0}")]
    Body(String),
}

impl ErrorCode for ProviderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::InvalidUrl(_) => "E_PROVIDER_URL",
            Self::Request(_) => "E_PROVIDER_REQUEST",
            Self::Status { .. } => "E_PROVIDER_STATUS",
            Self::Body(_) => "E_PROVIDER_BODY",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599 })
    }
}

/// Something that turns a prompt into image bytes.
#[async_trait::async_trait]
pub trait ImageProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the request fails or the provider
    /// answers with a non-success status.
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, ProviderError>;
}
