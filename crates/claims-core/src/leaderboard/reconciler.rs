//! Cache-aside read path for the provider leaderboard.

use super::top_n::TopNLeaderboard;
use crate::{
    metrics,
    store::{ClaimStore, StoreError},
    types::ProviderTotal,
};
use parking_lot::Mutex;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, info};

/// Serves top-N leaderboard reads, preferring the in-memory structure and
/// falling back to the durable store's aggregate query when the structure is
/// cold or its last repopulation is older than the TTL.
///
/// Owned by the composition root and shared via `Arc`; there is no global
/// instance. The result limit equals the leaderboard capacity.
pub struct TopProviderService {
    leaderboard: TopNLeaderboard,
    store: Arc<dyn ClaimStore>,
    limit: usize,
    ttl: Duration,
    /// Instant of the last repopulation from the store. `None` until the
    /// first miss resolves; writes alone never stamp it, so a structure
    /// warmed only by ingestion still defers to the store once.
    populated_at: Mutex<Option<Instant>>,
}

impl TopProviderService {
    #[must_use]
    pub fn new(leaderboard: TopNLeaderboard, store: Arc<dyn ClaimStore>, ttl: Duration) -> Self {
        let limit = leaderboard.capacity();
        Self { leaderboard, store, limit, ttl, populated_at: Mutex::new(None) }
    }

    /// Folds one ingested claim into the warm structure as a per-provider
    /// running sum. Total: never fails, never blocks on I/O.
    pub fn record_claim(&self, provider_npi: &str, net_fee: f64) {
        self.leaderboard.accumulate(provider_npi, net_fee);
    }

    /// Returns the top providers by summed net fee.
    ///
    /// Hit path: a snapshot of the warm structure. Miss path (cold or
    /// expired): the store's aggregate rows, which also rebuild the
    /// structure and restart the TTL clock.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] when the fallback aggregate query fails;
    /// a stale or empty result is never substituted.
    pub async fn top_providers(&self) -> Result<Vec<ProviderTotal>, StoreError> {
        if self.is_fresh() {
            metrics::record_leaderboard_read(true);
            debug!("serving top providers from leaderboard");
            return Ok(self
                .leaderboard
                .snapshot()
                .into_iter()
                .map(|entry| ProviderTotal {
                    provider_npi: entry.provider_npi.to_string(),
                    net_fee: entry.net_fee,
                })
                .collect());
        }

        metrics::record_leaderboard_read(false);
        debug!("leaderboard cold or expired, aggregating from store");

        let started = Instant::now();
        let rows = self.store.aggregate_top_providers(self.limit).await?;
        metrics::record_aggregate_latency(started.elapsed());

        self.leaderboard.clear();
        for row in &rows {
            self.leaderboard.push(&row.provider_npi, row.net_fee);
        }
        *self.populated_at.lock() = Some(Instant::now());
        metrics::record_leaderboard_size(self.leaderboard.len());
        info!(rows = rows.len(), "leaderboard repopulated from store");

        Ok(rows)
    }

    /// Number of providers currently held by the structure.
    #[must_use]
    pub fn leaderboard_len(&self) -> usize {
        self.leaderboard.len()
    }

    fn is_fresh(&self) -> bool {
        if self.leaderboard.is_empty() {
            return false;
        }
        let populated_at = *self.populated_at.lock();
        populated_at.is_some_and(|at| at.elapsed() < self.ttl)
    }
}
