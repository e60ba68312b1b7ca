//! # Log output targets.
//!
//! A [`LogTarget`] names one of the four destinations a registered event
//! can be routed to at runtime. Operators address targets by their label
//! ("console", "disc", "network", "sse") when toggling events or groups.

use std::fmt;
use std::str::FromStr;

/// Destination for event notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogTarget {
    /// Human-readable lines on stdout.
    Console,
    /// Month-stamped append-only log files.
    Disc,
    /// Newline-delimited JSON to a remote collector.
    Network,
    /// Server-sent-events fan-out to connected dashboards.
    Sse,
}

impl LogTarget {
    /// All targets, in display order.
    pub const ALL: [LogTarget; 4] = [
        LogTarget::Console,
        LogTarget::Disc,
        LogTarget::Network,
        LogTarget::Sse,
    ];

    /// Returns a short stable label (snake_case) for use in logs/metrics
    /// and on the operator surface.
    pub fn as_label(&self) -> &'static str {
        match self {
            LogTarget::Console => "console",
            LogTarget::Disc => "disc",
            LogTarget::Network => "network",
            LogTarget::Sse => "sse",
        }
    }
}

impl fmt::Display for LogTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl FromStr for LogTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" => Ok(LogTarget::Console),
            "disc" => Ok(LogTarget::Disc),
            "network" => Ok(LogTarget::Network),
            "sse" => Ok(LogTarget::Sse),
            other => Err(format!("unknown log target '{other}'")),
        }
    }
}
