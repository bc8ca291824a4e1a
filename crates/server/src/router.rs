use axum::{
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use claims_core::{
    config::AppConfig,
    metrics,
    middleware::RateLimiter,
    store::StoreError,
    types::{Claim, NewClaim, ProviderTotal},
    validation::ValidationError,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

use crate::{middleware::rate_limit_middleware, state::AppState};

/// Errors surfaced to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(StoreError::Timeout(_) | StoreError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Store(StoreError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Handles `POST /claims`: validates and persists a batch of claims.
///
/// The whole batch is validated before the first insert, so an invalid
/// payload rejects the batch without partial writes. Each stored claim is
/// folded into the leaderboard as a running per-provider sum.
///
/// # Errors
///
/// Returns 422 for an invalid payload and 5xx when the store fails.
pub async fn handle_add_claims(
    State(state): State<AppState>,
    Json(payload): Json<Vec<NewClaim>>,
) -> Result<(StatusCode, Json<Vec<Claim>>), ApiError> {
    for claim in &payload {
        claim.validate()?;
    }

    let mut created = Vec::with_capacity(payload.len());
    for claim in payload {
        let stored = state.store.insert_claim(claim).await?;
        state.top_providers.record_claim(&stored.provider_npi, stored.net_fee);
        metrics::record_claim_ingested();
        created.push(stored);
    }

    info!(claims = created.len(), "claim batch ingested");
    Ok((StatusCode::OK, Json(created)))
}

/// Handles `GET /top-providers`: the top-N leaderboard by summed net fee.
///
/// # Errors
///
/// Returns 503 when the structure is cold and the store's aggregate query
/// fails; a stale or empty result is never substituted.
pub async fn handle_top_providers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProviderTotal>>, ApiError> {
    let rows = state.top_providers.top_providers().await?;
    Ok(Json(rows))
}

/// Handles `GET /health`: liveness plus a leaderboard size hint.
pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let health_status = json!({
        "status": "healthy",
        "leaderboard": { "providers": state.top_providers.leaderboard_len() },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, [("content-type", "application/json")], health_status.to_string())
}

/// Handles `GET /metrics`: Prometheus exposition text.
pub async fn handle_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics_handle.render(),
    )
}

/// Assembles the application router.
///
/// Only the read endpoint sits behind the rate limiter; ingestion, health,
/// and metrics are unmetered.
#[must_use]
pub fn create_router(state: AppState, rate_limiter: Arc<RateLimiter>, config: &AppConfig) -> Router {
    let read_routes = Router::new()
        .route("/top-providers", get(handle_top_providers))
        .layer(axum_middleware::from_fn_with_state(rate_limiter, rate_limit_middleware));

    let mut router = Router::new()
        .route("/claims", post(handle_add_claims))
        .route("/health", get(handle_health))
        .merge(read_routes);

    if config.metrics.enabled {
        router = router.route("/metrics", get(handle_metrics));
    }

    router.layer(RequestBodyLimitLayer::new(config.server.max_body_bytes)).with_state(state)
}
