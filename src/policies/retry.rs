//! # Outbound retry policy for a remote party.
//!
//! Every [`RemoteParty`](crate::RemoteParty) carries a [`RetryPolicy`]. The
//! policy is **exposed, not executed**: the outbound transport asks for
//! `(request_timeout, delay_for(attempt), max_retries)` and performs the
//! actual retried call itself. This crate only stores and serves the knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::policies::BackoffPolicy;

/// Retry budget for calls to one roaming partner.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Per-attempt request timeout.
    pub request_timeout: Duration,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Delay schedule between attempts.
    pub backoff: BackoffPolicy,
}

impl Default for RetryPolicy {
    /// 30s per attempt, 3 retries, default exponential backoff.
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before retry `attempt` (0-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.delay_for(attempt)
    }

    /// Whether another retry fits the budget after `attempt` retries.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}
