//! Shared application state.
//!
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! provider is behind `Arc<dyn ImageProvider>` so tests can swap in a mock.

use std::sync::Arc;

use crate::imagegen::ImageProvider;

/// Clone is required by Axum; the provider is shared.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ImageProvider>,
}

impl AppState {
    #[must_use]
    pub fn new(provider: Arc<dyn ImageProvider>) -> Self {
        Self { provider }
    }
}
