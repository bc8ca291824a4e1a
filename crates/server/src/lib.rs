//! HTTP serving layer for the claims leaderboard service.
//!
//! This crate wraps the business logic from `claims_core` in an Axum
//! application: route handlers in [`router`], per-IP rate limiting in
//! [`middleware`], and the shared application state in [`state`]. The binary
//! entry point (`main.rs`) is the composition root that builds the state and
//! owns the server lifecycle.

pub mod middleware;
pub mod router;
pub mod state;
