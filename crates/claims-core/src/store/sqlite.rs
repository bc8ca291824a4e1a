//! `SQLite`-backed claim store.

use super::{ClaimStore, StoreError};
use crate::types::{Claim, NewClaim, ProviderTotal};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::time::Duration;
use tracing::{debug, info, warn};

const CREATE_CLAIMS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS claims (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    service_dttm TEXT NOT NULL,
    submitted_proc TEXT NOT NULL,
    group_id TEXT NOT NULL,
    subscriber_id TEXT NOT NULL,
    provider_npi TEXT NOT NULL,
    provider_fees REAL NOT NULL,
    allowed_fees REAL NOT NULL,
    member_co_ins REAL NOT NULL,
    member_co_pay REAL NOT NULL,
    quadrant TEXT,
    net_fee REAL NOT NULL
)";

/// The aggregate groups on this column; it stays indexed.
const CREATE_NPI_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS ix_claims_provider_npi ON claims (provider_npi)";

const AGGREGATE_TOP_PROVIDERS: &str = "\
SELECT provider_npi, SUM(net_fee) AS net_fee
FROM claims
GROUP BY provider_npi
ORDER BY net_fee DESC
LIMIT ?";

/// Claim store backed by a `SQLite` connection pool.
///
/// The aggregate query runs under a bounded timeout with a single retry;
/// inserts run unbounded (single-row writes on a local pool).
pub struct SqliteClaimStore {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl SqliteClaimStore {
    /// Connects to `database_url` and applies the schema.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the connection or DDL fails.
    pub async fn new(database_url: &str, query_timeout: Duration) -> Result<Self, StoreError> {
        let pool = SqlitePool::connect(database_url).await?;
        Self::from_pool(pool, query_timeout).await
    }

    /// Wraps an existing pool, applying the schema. Used by tests with
    /// single-connection in-memory pools.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the DDL fails.
    pub async fn from_pool(pool: SqlitePool, query_timeout: Duration) -> Result<Self, StoreError> {
        sqlx::query(CREATE_CLAIMS_TABLE).execute(&pool).await?;
        sqlx::query(CREATE_NPI_INDEX).execute(&pool).await?;
        info!("claims schema ready");
        Ok(Self { pool, query_timeout })
    }

    async fn try_aggregate(&self, limit: i64) -> Result<Vec<ProviderTotal>, StoreError> {
        let query = sqlx::query(AGGREGATE_TOP_PROVIDERS).bind(limit).fetch_all(&self.pool);

        let rows = tokio::time::timeout(self.query_timeout, query)
            .await
            .map_err(|_| StoreError::Timeout(self.query_timeout))??;

        rows.iter().map(row_to_provider_total).collect()
    }
}

fn row_to_provider_total(row: &SqliteRow) -> Result<ProviderTotal, StoreError> {
    Ok(ProviderTotal {
        provider_npi: row.try_get("provider_npi")?,
        net_fee: row.try_get("net_fee")?,
    })
}

#[async_trait]
impl ClaimStore for SqliteClaimStore {
    async fn insert_claim(&self, claim: NewClaim) -> Result<Claim, StoreError> {
        let service_dttm = claim.service_dttm.unwrap_or_else(Utc::now);
        let net_fee = claim.net_fee();

        let result = sqlx::query(
            "INSERT INTO claims (service_dttm, submitted_proc, group_id, subscriber_id, \
             provider_npi, provider_fees, allowed_fees, member_co_ins, member_co_pay, \
             quadrant, net_fee) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(service_dttm)
        .bind(&claim.submitted_proc)
        .bind(&claim.group_id)
        .bind(&claim.subscriber_id)
        .bind(&claim.provider_npi)
        .bind(claim.provider_fees)
        .bind(claim.allowed_fees)
        .bind(claim.member_co_ins)
        .bind(claim.member_co_pay)
        .bind(claim.quadrant.clone())
        .bind(net_fee)
        .execute(&self.pool)
        .await?;

        debug!(provider_npi = %claim.provider_npi, net_fee, "claim persisted");

        Ok(Claim {
            id: result.last_insert_rowid(),
            service_dttm,
            submitted_proc: claim.submitted_proc,
            group_id: claim.group_id,
            subscriber_id: claim.subscriber_id,
            provider_npi: claim.provider_npi,
            provider_fees: claim.provider_fees,
            allowed_fees: claim.allowed_fees,
            member_co_ins: claim.member_co_ins,
            member_co_pay: claim.member_co_pay,
            quadrant: claim.quadrant,
            net_fee,
        })
    }

    async fn aggregate_top_providers(
        &self,
        limit: usize,
    ) -> Result<Vec<ProviderTotal>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        match self.try_aggregate(limit).await {
            Ok(rows) => Ok(rows),
            Err(first) => {
                warn!(error = %first, "aggregate query failed, retrying once");
                self.try_aggregate(limit).await.map_err(|second| match second {
                    timeout @ StoreError::Timeout(_) => timeout,
                    other => StoreError::Unavailable(format!("aggregate failed after retry: {other}")),
                })
            }
        }
    }
}
