//! Background image generation bookkeeping.
//!
//! The engine never performs I/O itself. A host starts a generation with
//! [`BackgroundClient::begin`], sends the returned request to the proxy on
//! whatever transport it has (browser `fetch`, `reqwest` in the CLI), and hands
//! the outcome back through [`BackgroundClient::complete`] together with the
//! token it was issued. Only the most recently issued token is accepted; a
//! template switch invalidates the in-flight token so a late response generated
//! for the previous aspect ratio is dropped.

#[cfg(test)]
#[path = "background_test.rs"]
mod background_test;

use studio_wire::{ErrorResponse, GenerateRequest, GenerateResponse};

use crate::catalog::Template;

/// Identifies one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationToken(u64);

/// A validated request ready to send, tagged with its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGeneration {
    pub token: GenerationToken,
    pub request: GenerateRequest,
}

/// Errors produced while requesting a background.
#[derive(Debug, thiserror::Error)]
pub enum BackgroundError {
    /// The prompt is empty or whitespace; nothing is sent.
    #[error("Describe what you want to generate before continuing.")]
    EmptyPrompt,
    /// The proxy answered with a non-success status.
    #[error("Could not generate the image. Try again.")]
    Rejected { status: u16, message: String },
    /// The request never produced a response.
    #[error("Unexpected error generating the image.")]
    Transport(String),
    /// The proxy answered 2xx with an unusable body.
    #[error("Unexpected error generating the image.")]
    InvalidResponse(String),
}

/// What [`BackgroundClient::complete`] did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The image replaced the current background.
    Installed,
    /// The request failed; the previous background is untouched.
    Failed(String),
    /// The token was stale; the response was ignored.
    Discarded,
}

/// Current background plus the state of the latest generation request.
#[derive(Debug, Default)]
pub struct BackgroundClient {
    image: Option<String>,
    in_flight: Option<GenerationToken>,
    next_token: u64,
}

impl BackgroundClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `prompt` and issue a request sized to `template`.
    ///
    /// A new request supersedes any in-flight one.
    ///
    /// # Errors
    ///
    /// Returns [`BackgroundError::EmptyPrompt`] for blank prompts.
    pub fn begin(&mut self, prompt: &str, template: &Template) -> Result<PendingGeneration, BackgroundError> {
        if prompt.trim().is_empty() {
            return Err(BackgroundError::EmptyPrompt);
        }
        self.next_token += 1;
        let token = GenerationToken(self.next_token);
        self.in_flight = Some(token);
        Ok(PendingGeneration {
            token,
            request: GenerateRequest {
                prompt: prompt.to_owned(),
                width: Some(template.design_width),
                height: Some(template.design_height),
            },
        })
    }

    /// Accept the outcome of the request identified by `token`.
    pub fn complete(
        &mut self,
        token: GenerationToken,
        result: Result<GenerateResponse, BackgroundError>,
    ) -> GenerationOutcome {
        if self.in_flight != Some(token) {
            log::debug!("discarding stale background response {token:?}");
            return GenerationOutcome::Discarded;
        }
        self.in_flight = None;

        let result = result.and_then(|resp| {
            if resp.image.is_empty() {
                Err(BackgroundError::InvalidResponse("empty image".to_owned()))
            } else {
                Ok(resp.image)
            }
        });
        match result {
            Ok(image) => {
                self.image = Some(image);
                GenerationOutcome::Installed
            }
            Err(err) => {
                log::warn!("background generation failed: {err:?}");
                GenerationOutcome::Failed(err.to_string())
            }
        }
    }

    /// Make the in-flight request stale. Returns the token that was dropped.
    pub fn invalidate(&mut self) -> Option<GenerationToken> {
        self.in_flight.take()
    }

    /// Use a user-supplied image as background.
    pub fn set_image(&mut self, image: String) {
        self.image = Some(image);
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }
}

/// Interpret a proxy reply given its HTTP status and raw body.
///
/// # Errors
///
/// Non-2xx statuses become [`BackgroundError::Rejected`] carrying the proxy's
/// `{error}` message when present; an unparseable 2xx body becomes
/// [`BackgroundError::InvalidResponse`].
pub fn interpret_response(status: u16, body: &str) -> Result<GenerateResponse, BackgroundError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map_or_else(|_| body.to_owned(), |e| e.error);
        return Err(BackgroundError::Rejected { status, message });
    }
    serde_json::from_str::<GenerateResponse>(body).map_err(|e| BackgroundError::InvalidResponse(e.to_string()))
}
