//! Outbound retry policies.
//!
//! This module groups the knobs a [`RemoteParty`](crate::RemoteParty)
//! hands to the outbound transport: **how long** one attempt may take,
//! **how many** retries are allowed, and **how long** to wait in between.
//!
//! ## Contents
//! - [`RetryPolicy`] per-party retry budget (timeout / max retries / delays)
//! - [`BackoffPolicy`] how delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`] randomization to avoid retry lockstep
//!
//! ## Defaults
//! - `RetryPolicy::default()` → 30s per attempt, 3 retries.
//! - `BackoffPolicy::default()` → first=1s, factor=2.0, max=60s, jitter=Equal.

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;
