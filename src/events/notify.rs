//! # Core subscriber contract.
//!
//! `Notify` is the extension point for plugging handlers into an
//! [`EventBus`](crate::EventBus): log sinks, decision handlers,
//! test probes. Handlers are invoked with the notification timestamp, the
//! originating API, the payload, and a cancellation token; they may perform
//! I/O and suspend independently.
//!
//! ## Contract
//! - Implementations must not block the async runtime (prefer async I/O).
//! - A handler that has nothing to contribute returns [`Reply::Abstain`]
//!   rather than a sentinel value; the first-verified race skips
//!   abstentions without treating them as failures.
//! - Errors returned here propagate or are contained depending on the
//!   delivery variant — see [`EventBus`](crate::EventBus).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::error::NotifyError;
use crate::events::ApiHandle;

/// Outcome of a subscriber invocation that may decline to answer.
///
/// `Abstain` is an explicit "no opinion": it is not an error and never
/// wins a first-verified race, but it also never aborts one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply<R> {
    /// The subscriber produced a result.
    Value(R),
    /// The subscriber has no opinion on this notification.
    Abstain,
}

impl<R> Reply<R> {
    /// Returns true for [`Reply::Abstain`].
    pub fn is_abstain(&self) -> bool {
        matches!(self, Reply::Abstain)
    }

    /// Converts into `Option`, discarding the abstention marker.
    pub fn value(self) -> Option<R> {
        match self {
            Reply::Value(r) => Some(r),
            Reply::Abstain => None,
        }
    }
}

/// Contract for event-bus subscribers.
///
/// `E` is the notification payload, `R` the result type a subscriber may
/// produce (log sinks use the default `()`).
#[async_trait]
pub trait Notify<E, R = ()>: Send + Sync + 'static {
    /// Handle one notification.
    ///
    /// # Parameters
    /// - `at`: wall-clock timestamp of the observed request/response
    /// - `api`: protocol API instance the notification originates from
    /// - `event`: opaque payload (not owned)
    /// - `cancel`: cooperative cancellation for the delivery round
    async fn notify(
        &self,
        at: DateTime<Utc>,
        api: &ApiHandle,
        event: &E,
        cancel: &CancellationToken,
    ) -> Result<Reply<R>, NotifyError>;

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
