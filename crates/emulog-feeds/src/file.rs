//! File feed: reads an NDJSON log file and optionally follows it as it grows.
//!
//! Following uses a `notify` watcher on the file. Change events only wake the
//! reader; the reader itself decides what is new by tracking its offset, so
//! missed or coalesced events cost nothing but latency. A periodic wake-up
//! covers platforms where the watcher cannot be created. If the file shrinks
//! below the current offset it is assumed truncated and read from the start.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::mpsc;

use crate::{forward, forward_lines, FeedError, Forwarded, RecordSender, TaskFeed};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Read `path` to EOF, then keep reading appended lines when `follow` is set.
pub fn spawn_file_feed(path: impl Into<PathBuf>, follow: bool, tx: RecordSender) -> TaskFeed {
    let path = path.into();
    let name = path.display().to_string();
    let source = name.clone();
    let task = tokio::spawn(async move {
        let result = if follow {
            follow_file(&path, &source, &tx).await
        } else {
            read_file(&path, &source, &tx).await
        };
        if let Err(err) = result {
            tracing::error!(path = %source, %err, "file feed failed");
        }
    });
    TaskFeed::new(name, task)
}

async fn read_file(path: &Path, source: &str, tx: &RecordSender) -> Result<(), FeedError> {
    let reader = BufReader::new(File::open(path).await?);
    let sent = forward_lines(reader, source, tx).await?;
    tracing::info!(path = source, sent, "file feed reached EOF");
    Ok(())
}

async fn follow_file(path: &Path, source: &str, tx: &RecordSender) -> Result<(), FeedError> {
    let mut reader = BufReader::new(File::open(path).await?);
    let (wake_tx, mut wake_rx) = mpsc::unbounded_channel();

    // Held for the lifetime of the loop; dropping it stops the watch.
    let _watcher = match watch(path, wake_tx) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            tracing::warn!(path = source, %err, "file watch unavailable, polling instead");
            None
        }
    };

    let mut offset: u64 = 0;
    let mut pending = String::new();
    loop {
        let read = reader.read_line(&mut pending).await?;
        if read > 0 {
            offset += read as u64;
            // A line without its newline is still being written.
            if !pending.ends_with('\n') {
                continue;
            }
            if let Forwarded::Closed = forward(&pending, source, tx) {
                return Ok(());
            }
            pending.clear();
            continue;
        }

        if tx.is_closed() {
            return Ok(());
        }
        let _ = tokio::time::timeout(POLL_INTERVAL, wake_rx.recv()).await;

        let len = tokio::fs::metadata(path).await?.len();
        if len < offset {
            tracing::info!(path = source, len, offset, "file truncated, rereading");
            reader.seek(SeekFrom::Start(0)).await?;
            offset = 0;
            pending.clear();
        }
    }
}

fn watch(path: &Path, wake: mpsc::UnboundedSender<()>) -> Result<RecommendedWatcher, FeedError> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if res.is_ok() {
            let _ = wake.send(());
        }
    })?;
    watcher.watch(path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
