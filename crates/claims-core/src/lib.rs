//! # Claims Core
//!
//! Core library for the dental claims leaderboard service.
//!
//! This crate provides the foundational components for:
//!
//! - **[`leaderboard`]**: Bounded top-N provider leaderboard with a
//!   cache-aside reconciler that falls back to the durable store when the
//!   in-memory structure is cold or expired.
//!
//! - **[`store`]**: Claim persistence and the per-provider net-fee
//!   aggregation query, backed by `SQLite` via sqlx.
//!
//! - **[`middleware`]**: Token-bucket rate limiting for the read endpoint.
//!
//! - **[`metrics`]**: Prometheus metrics collection for monitoring and
//!   observability.
//!
//! - **[`config`]**: Layered application configuration (defaults, TOML file,
//!   environment overrides).
//!
//! - **[`types`]** / **[`validation`]**: Claim payloads, derived net fees,
//!   and ingress validation rules.
//!
//! ## Request Flow
//!
//! ```text
//! POST /claims                      GET /top-providers
//!       │                                  │
//!       ▼                                  ▼
//! ┌─────────────┐                   ┌─────────────┐
//! │  Validation │                   │ RateLimiter │── over limit ──► 429
//! └──────┬──────┘                   └──────┬──────┘
//!        │                                 │
//!        ▼                                 ▼
//! ┌─────────────┐                 ┌──────────────────┐
//! │ ClaimStore  │                 │TopProviderService│
//! │  (insert)   │                 └────────┬─────────┘
//! └──────┬──────┘                          │
//!        │                         warm? ──┴── cold/expired?
//!        ▼                           │            │
//! ┌──────────────┐   accumulate      ▼            ▼
//! │TopNLeaderboard│◄────────────  snapshot   aggregate query
//! └──────────────┘                            (repopulate)
//! ```
//!
//! The leaderboard holds per-provider running sums while warm; the store's
//! `GROUP BY` aggregate is the source of truth and rebuilds the structure on
//! every miss.

pub mod config;
pub mod leaderboard;
pub mod metrics;
pub mod middleware;
pub mod store;
pub mod types;
pub mod validation;
