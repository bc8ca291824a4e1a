//! Shared application state for route handlers.

use claims_core::{leaderboard::TopProviderService, store::ClaimStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Handles to the core services, built once in the composition root and
/// cloned into every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ClaimStore>,
    pub top_providers: Arc<TopProviderService>,
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn ClaimStore>,
        top_providers: Arc<TopProviderService>,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        Self { store, top_providers, metrics_handle }
    }
}
