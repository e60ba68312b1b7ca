//! # Process-wide runtime configuration.
//!
//! [`Config`] centralizes the defaults a roaming node is constructed with.
//! It is built once at startup and passed by reference to the sink set,
//! the command correlator, and party onboarding — there is no ambient
//! global state.
//!
//! ## Sentinel values
//! - `notify_timeout = 0s` → racing deliveries run without a timer task
//! - `sse_capacity` is clamped to a minimum of 1 by the SSE sink

use std::path::PathBuf;
use std::time::Duration;

use crate::policies::RetryPolicy;

/// Startup configuration for the roaming runtime.
///
/// ## Field semantics
/// - `command_horizon`: age after which an unanswered asynchronous command
///   is completed with a timeout result by the expiry sweep
/// - `notify_timeout`: default timer for racing deliveries (`0s` = none)
/// - `disc_path` / `disc_context`: directory and optional file-name prefix
///   for the disc sink's month-stamped log files
/// - `network_collector`: `host:port` the network sink ships records to
/// - `sse_capacity`: ring-buffer size of the server-sent-events fan-out;
///   lagging dashboards skip the overwritten frames
/// - `retry`: default outbound retry policy applied to new parties
#[derive(Clone, Debug)]
pub struct Config {
    /// Age at which pending commands are swept as timed out.
    pub command_horizon: Duration,

    /// Default timeout for `notify_any`/`notify_first` races
    /// (`Duration::ZERO` = no timer task).
    pub notify_timeout: Duration,

    /// Directory the disc sink writes log files into.
    pub disc_path: PathBuf,

    /// Optional context prefix for disc log file names.
    pub disc_context: Option<String>,

    /// Remote collector address for the network sink.
    pub network_collector: String,

    /// Ring-buffer capacity of the SSE fan-out (min 1; clamped by the sink).
    pub sse_capacity: usize,

    /// Default retry policy for newly onboarded parties.
    pub retry: RetryPolicy,
}

impl Config {
    /// Returns the racing-delivery timeout as an `Option`.
    ///
    /// - `None` → no timer task enters the race
    /// - `Some(d)` → a timer task competes and is a valid winner
    #[inline]
    pub fn notify_timeout(&self) -> Option<Duration> {
        if self.notify_timeout == Duration::ZERO {
            None
        } else {
            Some(self.notify_timeout)
        }
    }

    /// Returns the SSE capacity clamped to a minimum of 1.
    #[inline]
    pub fn sse_capacity_clamped(&self) -> usize {
        self.sse_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `command_horizon = 120s` (partners are expected to call back well
    ///   within two minutes)
    /// - `notify_timeout = 10s`
    /// - `disc_path = "logs"`, no context prefix
    /// - `network_collector = "127.0.0.1:9920"`
    /// - `sse_capacity = 1024`
    /// - `retry = RetryPolicy::default()`
    fn default() -> Self {
        Self {
            command_horizon: Duration::from_secs(120),
            notify_timeout: Duration::from_secs(10),
            disc_path: PathBuf::from("logs"),
            disc_context: None,
            network_collector: "127.0.0.1:9920".to_string(),
            sse_capacity: 1024,
            retry: RetryPolicy::default(),
        }
    }
}
