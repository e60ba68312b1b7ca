//! # Command result envelope.
//!
//! The partner delivers a command's outcome out-of-band to the response
//! URL; the inbound callback endpoint parses it into a [`CommandResult`]
//! and hands it to the correlator. Expired commands are completed with
//! [`CommandResult::timeout`] by the sweep.

use serde::{Deserialize, Serialize};

/// Outcome category of an asynchronous command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandResultKind {
    /// The charge point accepted and executed the command.
    Accepted,
    /// The charge point rejected the command.
    Rejected,
    /// Execution started but failed.
    Failed,
    /// No result arrived before the expiry horizon.
    Timeout,
    /// The referenced session is unknown to the partner.
    UnknownSession,
}

/// Result of one asynchronous command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    /// Outcome category.
    pub result: CommandResultKind,
    /// Optional human-readable detail from the partner.
    pub message: Option<String>,
}

impl CommandResult {
    /// Successful execution.
    pub fn accepted() -> Self {
        Self {
            result: CommandResultKind::Accepted,
            message: None,
        }
    }

    /// Rejection with a partner-supplied reason.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            result: CommandResultKind::Rejected,
            message: Some(message.into()),
        }
    }

    /// Failed execution with a partner-supplied reason.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            result: CommandResultKind::Failed,
            message: Some(message.into()),
        }
    }

    /// The expiry sweep's synthetic outcome.
    pub fn timeout() -> Self {
        Self {
            result: CommandResultKind::Timeout,
            message: None,
        }
    }
}
