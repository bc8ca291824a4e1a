//! Prometheus metrics collection.
//!
//! Counters and histograms are recorded through the lock-free `metrics`
//! facade on every request; the exporter handle renders the exposition text
//! for the `/metrics` endpoint.
//!
//! Recorded series:
//!
//! | Metric | Type | Meaning |
//! |--------|------|---------|
//! | `claims_ingested_total` | counter | Claims persisted |
//! | `leaderboard_reads_total{source}` | counter | Reads served, by `cache` or `store` |
//! | `aggregate_query_duration_seconds` | histogram | Store aggregate latency |
//! | `leaderboard_size` | gauge | Providers held after repopulation |

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::{sync::OnceLock, time::Duration};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn try_init_prometheus_recorder(
) -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Installs the process-wide Prometheus recorder and returns its handle.
///
/// Idempotent: later calls return the handle installed first. If a recorder
/// is already registered elsewhere (tests), a detached recorder is used so
/// rendering still works.
pub fn init_recorder() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| match try_init_prometheus_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to install Prometheus recorder, using detached fallback"
                );
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

/// Records one persisted claim.
pub fn record_claim_ingested() {
    counter!("claims_ingested_total").increment(1);
}

/// Records a leaderboard read, labeled by the serving side.
pub fn record_leaderboard_read(cache_hit: bool) {
    if cache_hit {
        counter!("leaderboard_reads_total", "source" => "cache").increment(1);
    } else {
        counter!("leaderboard_reads_total", "source" => "store").increment(1);
    }
}

/// Records the latency of one store aggregate query.
pub fn record_aggregate_latency(elapsed: Duration) {
    histogram!("aggregate_query_duration_seconds").record(elapsed.as_secs_f64());
}

/// Records the number of providers held after a repopulation.
#[allow(clippy::cast_precision_loss)] // leaderboard capacity is tiny
pub fn record_leaderboard_size(len: usize) {
    gauge!("leaderboard_size").set(len as f64);
}
