//! Error types used by the roaming runtime.
//!
//! This module defines the error enums of the four runtime surfaces:
//!
//! - [`NotifyError`] — delivery failures on an event bus.
//! - [`RegistryError`] — log-event registration collisions.
//! - [`PartyError`] — remote-party store and token-lookup failures.
//! - [`CommandError`] — asynchronous command correlation failures.
//!
//! All types provide `as_label` for stable snake_case identifiers in
//! logs/metrics.

use std::time::Duration;
use thiserror::Error;

use crate::commands::CorrelationId;
use crate::events::LogEventName;
use crate::parties::PartyRef;

/// # Errors produced while delivering a notification.
///
/// Racing delivery variants surface `Timeout`; all variants surface
/// `Canceled` when the caller's cancellation token fires mid-round.
/// Sink implementations report their own failures as `Io` or `Subscriber`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The timer entered the race and won, or the race ran out of
    /// competitors before any produced a result.
    #[error("no subscriber completed within {elapsed:?}")]
    Timeout {
        /// Wall time spent racing before giving up.
        elapsed: Duration,
    },

    /// The caller's cancellation token fired; outstanding subscriber
    /// futures were abandoned.
    #[error("delivery canceled")]
    Canceled,

    /// A sink failed on its underlying I/O (disc write, socket send).
    #[error("sink i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// A subscriber reported a domain failure of its own.
    #[error("subscriber '{subscriber}' failed: {message}")]
    Subscriber {
        /// Subscriber name as reported by [`Notify::name`](crate::Notify::name).
        subscriber: String,
        /// Human-readable failure detail.
        message: String,
    },
}

impl NotifyError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            NotifyError::Timeout { .. } => "notify_timeout",
            NotifyError::Canceled => "notify_canceled",
            NotifyError::Io(_) => "notify_io",
            NotifyError::Subscriber { .. } => "notify_subscriber_failed",
        }
    }
}

/// # Errors produced by the log-event registry.
///
/// Registration collisions are configuration errors and abort the
/// registration call. Runtime enable/disable of unknown names is **not**
/// an error: `debug`/`undebug` report `false` instead, so operator typos
/// never take down a running service.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The event name is already registered, in the request or the
    /// response registry. A name may live in exactly one of the two.
    #[error("event '{name}' is already registered")]
    DuplicateEvent {
        /// The colliding event name.
        name: LogEventName,
    },
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::DuplicateEvent { .. } => "duplicate_event",
        }
    }
}

/// # Errors produced by the remote-party store.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PartyError {
    /// Onboarding collision: a party with this identity already exists.
    #[error("party {id} is already registered")]
    DuplicateParty {
        /// The colliding party identity.
        id: PartyRef,
    },

    /// No party with this identity exists in the store.
    #[error("party {id} is not registered")]
    UnknownParty {
        /// The missing party identity.
        id: PartyRef,
    },

    /// Two distinct parties accept the same inbound access token.
    /// This is a configuration error and must surface to the operator,
    /// never be resolved by picking either party.
    #[error("access token is accepted by both {first} and {second}")]
    AmbiguousToken {
        /// First matching party.
        first: PartyRef,
        /// Second matching party.
        second: PartyRef,
    },
}

impl PartyError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PartyError::DuplicateParty { .. } => "duplicate_party",
            PartyError::UnknownParty { .. } => "unknown_party",
            PartyError::AmbiguousToken { .. } => "ambiguous_token",
        }
    }
}

/// # Errors produced by the command correlator.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// The callback's correlation id matches no pending command: the
    /// command was already resolved or expired, or the id is forged.
    /// The HTTP layer maps this to a rejected callback (404/409).
    #[error("unknown or already-resolved correlation id '{id}'")]
    UnknownCorrelation {
        /// The unmatched correlation id.
        id: CorrelationId,
    },

    /// The correlator went away before the command was resolved or
    /// expired. Only observable when awaiting an outcome across a
    /// correlator shutdown.
    #[error("command '{id}' was abandoned before completion")]
    Abandoned {
        /// Correlation id of the abandoned command.
        id: CorrelationId,
    },
}

impl CommandError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CommandError::UnknownCorrelation { .. } => "unknown_correlation",
            CommandError::Abandoned { .. } => "command_abandoned",
        }
    }
}
