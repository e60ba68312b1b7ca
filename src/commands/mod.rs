//! Asynchronous command correlation.
//!
//! ## Contents
//! - [`RequestId`], [`CorrelationId`] — the two independent opaque ids of
//!   an issued command
//! - [`CommandResult`], [`CommandResultKind`] — the outcome envelope
//! - [`CommandCorrelator`], [`OutstandingCommand`] — issue / resolve /
//!   expire over the pending-command table

mod correlator;
mod ids;
mod result;

pub use correlator::{CommandCorrelator, OutstandingCommand};
pub use ids::{CorrelationId, RequestId};
pub use result::{CommandResult, CommandResultKind};
