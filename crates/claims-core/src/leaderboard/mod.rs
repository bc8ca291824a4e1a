//! Bounded top-N provider leaderboard with cache-aside reconciliation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 TopProviderService                  │
//! │  (cache-aside read path, TTL-driven invalidation)   │
//! └──────────────┬──────────────────────┬───────────────┘
//!                │                      │
//!        ┌───────▼────────┐     ┌───────▼────────┐
//!        │ TopNLeaderboard │     │   ClaimStore   │
//!        │                │     │                │
//!        │ • NPI → score  │     │ • GROUP BY     │
//!        │   map          │     │   provider_npi │
//!        │ • min-heap for │     │ • SUM(net_fee) │
//!        │   eviction     │     │ • ORDER + LIMIT│
//!        └────────────────┘     └────────────────┘
//! ```
//!
//! The leaderboard is the fast path: ingestion folds each claim's net fee
//! into a per-provider running sum, and reads snapshot the structure while it
//! is warm. The store's aggregate query is the authority: every cold or
//! expired read clears the structure and rebuilds it from store-computed
//! sums, so drift between the two paths never outlives one TTL interval.

mod reconciler;
mod top_n;

pub use reconciler::TopProviderService;
pub use top_n::{LeaderboardError, ScoredEntry, TopNLeaderboard};
