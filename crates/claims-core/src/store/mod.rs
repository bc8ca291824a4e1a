//! Durable claim persistence and per-provider aggregation.
//!
//! The [`ClaimStore`] trait is the seam between the core and its storage
//! collaborator, enabling stub implementations in tests and backend
//! flexibility (current: `SQLite`; the schema is plain SQL either way).

use crate::types::{Claim, NewClaim, ProviderTotal};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod sqlite;

pub use sqlite::SqliteClaimStore;

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure (connection, statement, decode).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The aggregate query did not complete within its budget.
    #[error("aggregate query timed out after {0:?}")]
    Timeout(Duration),

    /// The store kept failing after the retry budget was spent.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Repository abstraction over claim persistence.
#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Persists a claim: derives its net fee, assigns identity, and returns
    /// the stored row.
    async fn insert_claim(&self, claim: NewClaim) -> Result<Claim, StoreError>;

    /// Groups all claims by provider, sums net fees, and returns the top
    /// `limit` providers ordered by that sum descending.
    async fn aggregate_top_providers(
        &self,
        limit: usize,
    ) -> Result<Vec<ProviderTotal>, StoreError>;
}
