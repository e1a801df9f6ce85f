//! Baseline values used when no layer overrides them.
//!
//! # Design
//! - Mirror the values the intake endpoint ships with locally.
//! - Policy and notification defaults come from `intake-core` so both crates agree.

/// Endpoint base URL.
pub(crate) const ENDPOINT: &str = "http://localhost:8000";
/// Client-wide request timeout in seconds.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Simulated transport delay in milliseconds.
pub(crate) const SIMULATED_DELAY_MS: u64 = 2_000;
