use anyhow::Result;
use axum::serve;
use claims_core::{
    config::AppConfig,
    leaderboard::{TopNLeaderboard, TopProviderService},
    metrics,
    middleware::RateLimiter,
    store::{ClaimStore, SqliteClaimStore},
};
use server::{router, state::AppState};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the logging system based on the configuration.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,claims_core={level},server={level}",
            level = config.logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        // "pretty" and any other format default to pretty logging
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(false),
            )
            .init();
    }
}

/// Builds the core services from configuration.
async fn init_core_services(config: &AppConfig) -> Result<AppState> {
    let metrics_handle = metrics::init_recorder();

    let store: Arc<dyn ClaimStore> = Arc::new(
        SqliteClaimStore::new(&config.database.url, config.query_timeout())
            .await
            .map_err(|e| anyhow::anyhow!("Claim store initialization failed: {e}"))?,
    );
    info!(url = %config.database.url, "claim store initialized");

    let leaderboard = TopNLeaderboard::new(config.leaderboard.capacity)
        .map_err(|e| anyhow::anyhow!("Leaderboard initialization failed: {e}"))?;
    let top_providers = Arc::new(TopProviderService::new(
        leaderboard,
        Arc::clone(&store),
        config.leaderboard_ttl(),
    ));
    info!(
        capacity = config.leaderboard.capacity,
        ttl_seconds = config.leaderboard.ttl_seconds,
        "top-provider leaderboard initialized"
    );

    Ok(AppState::new(store, top_providers, metrics_handle))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;
    init_logging(&config);
    info!(environment = %config.environment, "starting claims server");

    let state = init_core_services(&config).await?;

    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit.max_requests,
        config.rate_limit_window(),
    ));
    rate_limiter.start_cleanup_task();

    let app = router::create_router(state, rate_limiter, &config);

    let addr = config
        .socket_addr()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {e}"))?;
    info!(address = %addr, "claims server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = serve(listener, app.into_make_service_with_connect_info::<SocketAddr>());

    if let Err(e) = server.with_graceful_shutdown(shutdown_signal()).await {
        error!(error = %e, "Server error occurred");
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");

                () = std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
