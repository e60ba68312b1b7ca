//! # Network sink: NDJSON shipping to a remote collector.
//!
//! Serializes each record as one JSON line and writes it to a TCP
//! connection. The connection is established lazily on the first record
//! and dropped on any write error; the next record reconnects. A sink
//! that cannot reach its collector fails the individual delivery — the
//! racing bus variants contain that failure, `notify_all` propagates it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::NotifyError;
use crate::events::{ApiHandle, LogRecord, Notify, Reply};

/// Line-oriented TCP log shipper.
pub struct NetworkSink {
    collector: String,
    conn: Mutex<Option<TcpStream>>,
}

impl NetworkSink {
    /// Creates a sink shipping to `collector` (`host:port`). No connection
    /// is attempted until the first record arrives.
    pub fn new(collector: impl Into<String>) -> Self {
        Self {
            collector: collector.into(),
            conn: Mutex::new(None),
        }
    }

    /// Collector address this sink ships to.
    pub fn collector(&self) -> &str {
        &self.collector
    }
}

#[async_trait]
impl Notify<LogRecord> for NetworkSink {
    async fn notify(
        &self,
        at: DateTime<Utc>,
        api: &ApiHandle,
        record: &LogRecord,
        cancel: &CancellationToken,
    ) -> Result<Reply<()>, NotifyError> {
        if cancel.is_cancelled() {
            return Err(NotifyError::Canceled);
        }

        let line = serde_json::json!({
            "event": record.event.as_str(),
            "at": at.to_rfc3339(),
            "api": api.to_string(),
            "body": &*record.body,
        })
        .to_string();

        let mut conn = self.conn.lock().await;
        if conn.is_none() {
            *conn = Some(TcpStream::connect(&self.collector).await?);
        }
        let Some(stream) = conn.as_mut() else {
            return Err(NotifyError::Subscriber {
                subscriber: "network".to_string(),
                message: "connection unavailable".to_string(),
            });
        };

        let res = async {
            stream.write_all(line.as_bytes()).await?;
            stream.write_all(b"\n").await
        }
        .await;

        if let Err(e) = res {
            // drop the broken stream; the next record reconnects
            conn.take();
            return Err(NotifyError::Io(e));
        }
        Ok(Reply::Value(()))
    }

    fn name(&self) -> &'static str {
        "network"
    }
}
