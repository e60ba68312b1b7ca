//! # Jitter for retry delays.
//!
//! When several outbound calls to the same partner fail together (partner
//! restart, network blip), un-jittered backoff retries them in lockstep.
//! [`JitterPolicy`] randomizes each delay to spread the retry load.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Randomization applied to a backoff delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JitterPolicy {
    /// No jitter: use the exact backoff delay. Predictable; fine when a
    /// single command stream retries.
    #[default]
    None,

    /// Random delay in `[0, delay]`. Maximum spreading, may retry almost
    /// immediately.
    Full,

    /// `delay/2 + random[0, delay/2]`. Preserves most of the backoff while
    /// still de-synchronizing retries.
    Equal,
}

impl JitterPolicy {
    /// Applies this policy to the given delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => Self::full(delay),
            JitterPolicy::Equal => Self::equal(delay),
        }
    }

    fn full(delay: Duration) -> Duration {
        let ms = delay.as_millis() as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=ms))
    }

    fn equal(delay: Duration) -> Duration {
        let ms = delay.as_millis() as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        let half = ms / 2;
        let jitter = if half == 0 {
            0
        } else {
            rand::rng().random_range(0..=half)
        };
        Duration::from_millis(half + jitter)
    }
}
