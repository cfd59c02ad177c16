//! emulog-feeds: record sources for emulog.
//!
//! A feed reads newline-delimited JSON log records (the shape the emulator
//! hub pushes on its logging stream), decodes each line into a
//! [`LogRecord`] and sends it down an unbounded channel. The UI drains the
//! receiving end once per tick; the headless mode drains it to completion.
//!
//! Lines that are not valid records are logged at `warn` and skipped so a
//! single malformed line never stops a feed.

pub mod file;
pub mod stdin;

use emulog_core::LogRecord;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

pub use file::spawn_file_feed;
pub use stdin::spawn_stdin_feed;

/// Sending half handed to every feed.
pub type RecordSender = UnboundedSender<LogRecord>;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("file watch failed: {0}")]
    Watch(#[from] notify::Error),
}

/// A running feed.
pub trait FeedHandle: Send + Sync {
    /// Short label for status lines (`stdin`, the file path, …).
    fn name(&self) -> &str;
    /// Whether the feed has stopped producing records.
    fn is_finished(&self) -> bool;
}

/// A feed driven by a spawned tokio task.
#[derive(Debug)]
pub struct TaskFeed {
    name: String,
    task: JoinHandle<()>,
}

impl TaskFeed {
    pub(crate) fn new(name: impl Into<String>, task: JoinHandle<()>) -> Self {
        Self { name: name.into(), task }
    }

    /// Stop the feed early.
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl FeedHandle for TaskFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Decode one line of input. Blank lines yield `Ok(None)`.
pub fn decode_line(line: &str) -> Result<Option<LogRecord>, FeedError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

/// Decode and forward every line of `reader` until EOF or until the
/// receiver is dropped. Returns the number of records sent.
pub async fn forward_lines<R>(mut reader: R, source: &str, tx: &RecordSender) -> Result<usize, FeedError>
where
    R: AsyncBufRead + Unpin,
{
    let mut sent = 0;
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(sent);
        }
        match forward(&line, source, tx) {
            Forwarded::Sent => sent += 1,
            Forwarded::Skipped => {}
            Forwarded::Closed => return Ok(sent),
        }
    }
}

pub(crate) enum Forwarded {
    Sent,
    Skipped,
    /// The receiver was dropped.
    Closed,
}

/// Decode `line` and send it.
pub(crate) fn forward(line: &str, source: &str, tx: &RecordSender) -> Forwarded {
    match decode_line(line) {
        Ok(Some(record)) => match tx.send(record) {
            Ok(()) => Forwarded::Sent,
            Err(_) => Forwarded::Closed,
        },
        Ok(None) => Forwarded::Skipped,
        Err(err) => {
            tracing::warn!(source, %err, "skipping undecodable line");
            Forwarded::Skipped
        }
    }
}
