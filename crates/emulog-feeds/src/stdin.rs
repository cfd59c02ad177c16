//! Stdin feed: NDJSON records piped into `emulog`.

use tokio::io::BufReader;

use crate::{forward_lines, RecordSender, TaskFeed};

pub const STDIN_FEED: &str = "stdin";

/// Read records from stdin until EOF.
pub fn spawn_stdin_feed(tx: RecordSender) -> TaskFeed {
    let task = tokio::spawn(async move {
        let reader = BufReader::new(tokio::io::stdin());
        match forward_lines(reader, STDIN_FEED, &tx).await {
            Ok(sent) => tracing::info!(sent, "stdin feed reached EOF"),
            Err(err) => tracing::error!(%err, "stdin feed failed"),
        }
    });
    TaskFeed::new(STDIN_FEED, task)
}
