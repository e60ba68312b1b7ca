//! # Server-sent-events sink.
//!
//! [`SseSink`] is a thin wrapper around [`tokio::sync::broadcast`] fanning
//! log records out to connected dashboard streams.
//!
//! ## Rules
//! - **Non-blocking publish**: delivering a record never waits for
//!   dashboards; send clones the frame into a bounded ring buffer.
//! - **Bounded capacity**: one ring buffer is shared by all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip
//!   the `n` overwritten frames.
//! - **No persistence**: frames published with no connected receiver are
//!   dropped.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::error::NotifyError;
use crate::events::{ApiHandle, LogEventName, LogRecord, Notify, Reply};

/// One event on the wire towards a dashboard.
#[derive(Clone, Debug)]
pub struct SseFrame {
    /// Event name, becomes the SSE `event:` field.
    pub event: LogEventName,
    /// Timestamp of the logged request/response.
    pub at: DateTime<Utc>,
    /// Originating API, rendered into the data line.
    pub api: String,
    /// Raw payload body, becomes the SSE `data:` field.
    pub data: Arc<str>,
}

impl SseFrame {
    /// Renders the frame in SSE wire format.
    pub fn to_wire(&self) -> String {
        format!("event: {}\ndata: {}\n\n", self.event, self.data)
    }
}

/// Broadcast fan-out of log records to SSE clients.
///
/// Cheap to clone internally (the sender is `Arc`-backed); the HTTP layer
/// calls [`SseSink::subscribe`] once per connected client and forwards
/// frames until the client disconnects.
pub struct SseSink {
    tx: broadcast::Sender<SseFrame>,
}

impl SseSink {
    /// Creates a sink with the given ring-buffer capacity (min 1, clamped).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Creates an independent receiver observing subsequent frames.
    ///
    /// A receiver only gets frames published **after** it subscribes;
    /// falling behind by more than the capacity skips the overwritten
    /// frames with `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<SseFrame> {
        self.tx.subscribe()
    }

    /// Number of currently connected receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl Notify<LogRecord> for SseSink {
    async fn notify(
        &self,
        at: DateTime<Utc>,
        api: &ApiHandle,
        record: &LogRecord,
        _cancel: &CancellationToken,
    ) -> Result<Reply<()>, NotifyError> {
        let frame = SseFrame {
            event: record.event.clone(),
            at,
            api: api.to_string(),
            data: Arc::clone(&record.body),
        };
        // no receivers is not a failure; the frame is simply dropped
        let _ = self.tx.send(frame);
        Ok(Reply::Value(()))
    }

    fn name(&self) -> &'static str {
        "sse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_frames() {
        let sink = SseSink::new(16);
        let mut rx = sink.subscribe();
        let api = ApiHandle::new("hub", crate::events::OcpiVersion::V3_0);
        let cancel = CancellationToken::new();
        let record = LogRecord::new("PostSessionResponse", r#"{"ok":true}"#);

        sink.notify(Utc::now(), &api, &record, &cancel).await.unwrap();

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.event.as_str(), "PostSessionResponse");
        assert_eq!(&*frame.data, r#"{"ok":true}"#);
        assert_eq!(frame.api, "hub-3.0");
    }

    #[tokio::test]
    async fn test_publish_without_receivers_is_not_an_error() {
        let sink = SseSink::new(16);
        let api = ApiHandle::new("hub", crate::events::OcpiVersion::V3_0);
        let cancel = CancellationToken::new();
        let record = LogRecord::new("PostSessionResponse", "{}");

        let res = sink.notify(Utc::now(), &api, &record, &cancel).await;
        assert!(res.is_ok());
    }

    #[test]
    fn test_wire_format() {
        let frame = SseFrame {
            event: LogEventName::new("PutTokenRequest"),
            at: Utc::now(),
            api: "cpo-2.2.1".to_string(),
            data: Arc::from(r#"{"uid":"X1"}"#),
        };
        assert_eq!(
            frame.to_wire(),
            "event: PutTokenRequest\ndata: {\"uid\":\"X1\"}\n\n"
        );
    }
}
