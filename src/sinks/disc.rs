//! # Disc sink: month-stamped append-only log files.
//!
//! One file per event and calendar month, named
//! `path/[context_]<event>_<year>-<month>.log` with a zero-padded month.
//! Records append as single lines; writes are serialized through an async
//! mutex so lines from concurrent deliveries never interleave.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::NotifyError;
use crate::events::{ApiHandle, LogRecord, Notify, Reply};

/// Append-only file writer.
pub struct DiscSink {
    path: PathBuf,
    context: Option<String>,
    write_guard: Mutex<()>,
}

impl DiscSink {
    /// Creates a sink writing into `path` (created on first write).
    ///
    /// `context` is an optional prefix shared by all files of this sink,
    /// e.g. a node name separating several instances logging into one
    /// directory.
    pub fn new(path: impl Into<PathBuf>, context: Option<String>) -> Self {
        Self {
            path: path.into(),
            context,
            write_guard: Mutex::new(()),
        }
    }

    /// File the given event logs to at the given instant.
    pub fn log_file(&self, event: &str, at: DateTime<Utc>) -> PathBuf {
        log_file_name(&self.path, self.context.as_deref(), event, at)
    }
}

/// Builds the month-stamped log file path:
/// `path/[context_]<event>_<year>-<zero-padded month>.log`.
pub fn log_file_name(
    path: &Path,
    context: Option<&str>,
    event: &str,
    at: DateTime<Utc>,
) -> PathBuf {
    let prefix = match context {
        Some(c) => format!("{c}_"),
        None => String::new(),
    };
    path.join(format!(
        "{prefix}{event}_{}-{:02}.log",
        at.year(),
        at.month()
    ))
}

#[async_trait]
impl Notify<LogRecord> for DiscSink {
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

        let file = self.log_file(record.event.as_str(), at);
        let line = format!("{} api={} {}\n", at.to_rfc3339(), api, record.body);

        let _guard = self.write_guard.lock().await;
        tokio::fs::create_dir_all(&self.path).await?;
        let mut out = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file)
            .await?;
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
        Ok(Reply::Value(()))
    }

    fn name(&self) -> &'static str {
        "disc"
    }
}
