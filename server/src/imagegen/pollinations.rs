//! Pollinations image API client.
//!
//! Thin HTTP wrapper for `GET /prompt/{prompt}`. URL construction is a pure
//! function for testability.

#[cfg(test)]
#[path = "pollinations_test.rs"]
mod tests;

use std::time::Duration;

use rand::Rng;
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::{GeneratedImage, ImageProvider, ImageRequest, ProviderError};
use crate::config::ProviderConfig;

/// Exclusive upper bound of the random seed sent with each request.
const SEED_RANGE_END: u32 = 100_000;

pub struct PollinationsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PollinationsClient {
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::InvalidUrl(config.base_url.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ProviderError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url })
    }
}

#[async_trait::async_trait]
impl ImageProvider for PollinationsClient {
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, ProviderError> {
        let seed = rand::rng().random_range(0..SEED_RANGE_END);
        let url = image_url(&self.base_url, request, seed)?;
        tracing::debug!(width = request.width, height = request.height, seed, "requesting image");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "image/jpeg")
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status { status: status.as_u16() });
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Body(e.to_string()))?;

        Ok(GeneratedImage { content_type, bytes: bytes.to_vec() })
    }
}

/// `{base}/prompt/{prompt}?width&height&nologo=true&seed`, prompt
/// percent-encoded as a single path segment.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidUrl`] if `base` cannot carry a path.
pub fn image_url(base: &Url, request: &ImageRequest, seed: u32) -> Result<Url, ProviderError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ProviderError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .push("prompt")
        .push(&request.prompt);
    url.query_pairs_mut()
        .clear()
        .append_pair("width", &request.width.to_string())
        .append_pair("height", &request.height.to_string())
        .append_pair("nologo", "true")
        .append_pair("seed", &seed.to_string());
    Ok(url)
}
