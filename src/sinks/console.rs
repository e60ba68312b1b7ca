//! # Console sink.
//!
//! Prints one human-readable line per notification to stdout. Primarily
//! useful during development and demos; production nodes route to the
//! disc, network, or SSE sinks.
//!
//! ## Output format
//! ```text
//! [PutTokenRequest] at=2026-08-04T10:15:00+00:00 api=emsp-2.2.1 {"token":...}
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::error::NotifyError;
use crate::events::{ApiHandle, LogRecord, Notify, Reply};

/// Stdout line writer.
#[derive(Debug, Default)]
pub struct ConsoleSink;

#[async_trait]
impl Notify<LogRecord> for ConsoleSink {
    async fn notify(
        &self,
        at: DateTime<Utc>,
        api: &ApiHandle,
        record: &LogRecord,
        _cancel: &CancellationToken,
    ) -> Result<Reply<()>, NotifyError> {
        println!(
            "[{}] at={} api={} {}",
            record.event,
            at.to_rfc3339(),
            api,
            record.body
        );
        Ok(Reply::Value(()))
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
