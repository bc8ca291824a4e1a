//! HTTP middleware adapters for the claims server.
//!
//! Axum middleware here handles HTTP-specific concerns (extracting the
//! client address, turning a rejected check into a status code) while
//! delegating the business logic to `claims_core::middleware`.

pub mod rate_limiting;

pub use rate_limiting::rate_limit_middleware;
