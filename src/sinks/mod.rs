//! Built-in log sinks and the process-wide sink set.
//!
//! Each sink implements [`Notify<LogRecord>`](crate::Notify) — a single
//! capability: handle one `(timestamp, api, payload)` notification under a
//! cancellation token.
//!
//! ## Architecture
//! ```text
//! EventBus<LogRecord> (one per registered event)
//!        │
//!        ├──► ConsoleSink   stdout lines
//!        ├──► DiscSink      month-stamped append-only files
//!        ├──► NetworkSink   NDJSON over TCP to a collector
//!        └──► SseSink       broadcast fan-out to dashboards
//! ```
//!
//! [`SinkSet`] bundles one instance of each, built once at startup and
//! shared by every registered event logger.

mod console;
mod disc;
mod network;
mod sse;

use std::sync::Arc;

pub use console::ConsoleSink;
pub use disc::{log_file_name, DiscSink};
pub use network::NetworkSink;
pub use sse::{SseFrame, SseSink};

use crate::config::Config;
use crate::events::{LogRecord, Notify};
use crate::logging::LogTarget;

/// The four shared sink instances of one roaming node.
#[derive(Clone)]
pub struct SinkSet {
    console: Arc<ConsoleSink>,
    disc: Arc<DiscSink>,
    network: Arc<NetworkSink>,
    sse: Arc<SseSink>,
}

impl SinkSet {
    /// Builds the sink set from explicit instances.
    pub fn new(
        console: Arc<ConsoleSink>,
        disc: Arc<DiscSink>,
        network: Arc<NetworkSink>,
        sse: Arc<SseSink>,
    ) -> Self {
        Self {
            console,
            disc,
            network,
            sse,
        }
    }

    /// Builds the sink set from startup configuration.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            Arc::new(ConsoleSink),
            Arc::new(DiscSink::new(
                cfg.disc_path.clone(),
                cfg.disc_context.clone(),
            )),
            Arc::new(NetworkSink::new(cfg.network_collector.clone())),
            Arc::new(SseSink::new(cfg.sse_capacity_clamped())),
        )
    }

    /// The shared sink behind the given target.
    pub fn sink_for(&self, target: LogTarget) -> Arc<dyn Notify<LogRecord>> {
        match target {
            LogTarget::Console => Arc::clone(&self.console) as Arc<dyn Notify<LogRecord>>,
            LogTarget::Disc => Arc::clone(&self.disc) as Arc<dyn Notify<LogRecord>>,
            LogTarget::Network => Arc::clone(&self.network) as Arc<dyn Notify<LogRecord>>,
            LogTarget::Sse => Arc::clone(&self.sse) as Arc<dyn Notify<LogRecord>>,
        }
    }

    /// The SSE fan-out, for the HTTP layer to hand receivers to clients.
    pub fn sse(&self) -> &Arc<SseSink> {
        &self.sse
    }
}
