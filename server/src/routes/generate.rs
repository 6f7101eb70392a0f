//! `POST /api/generate`: prompt in, base64 image data URL out.
//!
//! ERROR HANDLING
//! ==============
//! The body is read as raw bytes and parsed here rather than through the
//! `Json` extractor, so a malformed body maps to the same 500 `{error}` shape
//! as every other unexpected failure instead of axum's plain-text rejection.

#[cfg(test)]
#[path = "generate_test.rs"]
mod generate_test;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::Value;
use studio_wire::{ErrorResponse, GenerateResponse, resolve_dimension};

use crate::error::ErrorCode;
use crate::imagegen::{ImageRequest, ProviderError};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, non-string, empty or whitespace-only prompt.
    #[error("Prompt is required.")]
    MissingPrompt,

    /// The provider answered with a non-success status.
    #[error("The image model is unavailable.")]
    Upstream(#[source] ProviderError),

    /// Anything else: malformed body, transport failure, body read.
    #[error("Unexpected error generating the image.")]
    Unexpected(String),
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingPrompt => "E_MISSING_PROMPT",
            Self::Upstream(_) => "E_UPSTREAM_UNAVAILABLE",
            Self::Unexpected(_) => "E_UNEXPECTED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::MissingPrompt => false,
            Self::Upstream(e) => e.retryable(),
            Self::Unexpected(_) => true,
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Status { .. } => Self::Upstream(err),
            other => Self::Unexpected(other.to_string()),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingPrompt => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::MissingPrompt => {}
            Self::Upstream(source) => {
                tracing::warn!(
                    code = self.error_code(),
                    retryable = self.retryable(),
                    error = %source,
                    "image provider unavailable"
                );
            }
            Self::Unexpected(detail) => {
                tracing::error!(
                    code = self.error_code(),
                    retryable = self.retryable(),
                    error = %detail,
                    "error generating image"
                );
            }
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// Validate a raw request payload into a provider request.
///
/// # Errors
///
/// [`ApiError::MissingPrompt`] unless `prompt` is a non-blank string.
pub fn parse_request(payload: &Value) -> Result<ImageRequest, ApiError> {
    let prompt = payload
        .get("prompt")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::MissingPrompt)?;
    Ok(ImageRequest {
        prompt: prompt.to_string(),
        width: resolve_dimension(payload.get("width")),
        height: resolve_dimension(payload.get("height")),
    })
}

pub async fn generate(State(state): State<AppState>, body: Bytes) -> Result<Json<GenerateResponse>, ApiError> {
    let payload: Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::Unexpected(format!("malformed request body: {e}")))?;
    let request = parse_request(&payload)?;

    let image = state.provider.generate(&request).await?;
    tracing::info!(
        width = request.width,
        height = request.height,
        bytes = image.bytes.len(),
        "image generated"
    );
    Ok(Json(GenerateResponse { image: image.to_data_url() }))
}
