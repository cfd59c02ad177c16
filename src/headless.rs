//! Headless mode: filter a feed with a query and print matches as NDJSON.

use std::io::Write;

use emulog_core::{is_query_match, parse_query, AccessorCache, LogRecord};
use tokio::sync::mpsc::UnboundedReceiver;

/// Drain `records` until every sender is gone, writing each record that
/// matches `query` to `out` as one JSON line. Returns the number written.
pub async fn run_headless<W: Write>(
    mut records: UnboundedReceiver<LogRecord>,
    query: &str,
    out: &mut W,
) -> anyhow::Result<usize> {
    let parsed = parse_query(query);
    for raw in parsed.invalid_pairs() {
        tracing::warn!(pair = raw, "ignoring filter with unknown key");
    }
    let filter = parsed.filters;
    let mut cache = AccessorCache::new();

    let mut written = 0;
    while let Some(record) = records.recv().await {
        if !is_query_match(&filter, &record, &mut cache) {
            continue;
        }
        serde_json::to_writer(&mut *out, &record)?;
        out.write_all(b"\n")?;
        written += 1;
    }
    out.flush()?;
    tracing::info!(written, "headless run complete");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn writes_only_matches() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut warn = LogRecord::new("warn", "disk almost full", 2);
        warn.data.insert("user".into(), json!({"pct": 97}));
        tx.send(LogRecord::new("info", "started", 1)).unwrap();
        tx.send(warn).unwrap();
        drop(tx);

        let mut out = Vec::new();
        let n = run_headless(rx, "level=warn user.pct=97", &mut out).await.unwrap();
        assert_eq!(n, 1);

        let text = String::from_utf8(out).unwrap();
        let line: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(line["message"], "disk almost full");
    }
}
