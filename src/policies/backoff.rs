//! # Delay schedule for retried outbound requests.
//!
//! [`BackoffPolicy`] controls how the inter-retry delay grows when repeated
//! calls to a roaming partner fail. The delay for attempt `n` is
//! `first × factor^n`, clamped to `max`, with jitter applied last. The base
//! is derived purely from the attempt number, so jitter output never feeds
//! back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use roamvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(500),
//!     max: Duration::from_secs(30),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.delay_for(0), Duration::from_millis(500));
//! assert_eq!(backoff.delay_for(1), Duration::from_secs(1));
//! // 500ms × 2^10 would be ~8.5min → capped at max=30s
//! assert_eq!(backoff.delay_for(10), Duration::from_secs(30));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::policies::jitter::JitterPolicy;

/// Inter-retry delay policy for calls to a remote party.
///
/// Exposed by the party record to the outbound transport; this crate never
/// sleeps on it itself.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter applied to the clamped base delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Exponential doubling from 1s, capped at 60s, with equal jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(1),
            max: Duration::from_secs(60),
            factor: 2.0,
            jitter: JitterPolicy::Equal,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay before retry `attempt` (0-indexed).
    ///
    /// The base delay is `first × factor^attempt`, clamped to
    /// [`BackoffPolicy::max`]; non-finite or negative intermediates clamp
    /// to `max` as well. Jitter is applied to the clamped base and never
    /// fed back into subsequent attempts.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = attempt.min(i32::MAX as u32) as i32;
        let raw_secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !raw_secs.is_finite() || raw_secs < 0.0 || raw_secs > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(raw_secs)
        };

        self.jitter.apply(base)
    }
}
