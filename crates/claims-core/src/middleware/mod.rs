//! Request middleware business logic.
//!
//! This module provides the transport-agnostic side of request processing;
//! the Axum adapters (extractors, status codes) live in
//! `crates/server/src/middleware`.
//!
//! # Rate Limiting Layer
//!
//! The read endpoint is guarded by a **windowed token bucket** with per-client
//! state:
//!
//! - `max_requests`: bucket capacity, also the per-window budget (e.g. 10)
//! - `window`: the refill period (e.g. 60 s)
//!
//! Tokens refill continuously at `max_requests / window`:
//!
//! ```rust,ignore
//! tokens_to_add = elapsed / window * max_requests
//! current_tokens = min(current_tokens + tokens_to_add, max_requests)
//! ```
//!
//! This allows bursts up to `max_requests` while enforcing the sustained
//! per-window budget. Buckets are keyed by client IP, capped in number to
//! bound memory against spoofed sources, and swept by a background task.

pub mod rate_limiting;

pub use rate_limiting::RateLimiter;
