//! NDJSON corpora in the shape the emulator hub writes them.

use std::io::Write;
use std::path::{Path, PathBuf};

/// A short emulator session: startup, a function invocation with user
/// payloads, and a Firestore warning.
pub const SESSION: &[&str] = &[
    r#"{"level":"info","message":"Starting emulators: functions, firestore","timestamp":1700000000000,"data":{"metadata":{"emulator":{"name":"hub"}}}}"#,
    r#"{"level":"info","message":"Beginning execution of \"hello\"","timestamp":1700000001000,"data":{"metadata":{"emulator":{"name":"functions"},"function":{"name":"us-central1-hello"}}}}"#,
    r#"{"level":"user","message":"order received","timestamp":1700000001100,"data":{"user":{"order":{"id":7,"paid":true,"items":["tea","cake"]},"customer":"Ada"},"metadata":{"emulator":{"name":"functions"},"function":{"name":"us-central1-hello"}}}}"#,
    r#"{"level":"user","message":"order received","timestamp":1700000001200,"data":{"user":{"order":{"id":8,"paid":false,"items":[]},"customer":"Grace"},"metadata":{"emulator":{"name":"functions"},"function":{"name":"us-central1-hello"}}}}"#,
    r#"{"level":"warn","message":"Detected non-HTTP function trigger","timestamp":1700000002000,"data":{"metadata":{"emulator":{"name":"firestore"}}}}"#,
    r#"{"level":"error","message":"Function crashed","timestamp":1700000003000,"data":{"user":{"error":{"code":"internal"}},"metadata":{"emulator":{"name":"functions"},"function":{"name":"us-central1-charge"}}}}"#,
];

/// Lines the decoder must skip without ending the feed.
pub const NOISE: &[&str] = &[
    "",
    "   ",
    "i  emulators: Starting emulators: functions",
    r#"{"level":"info","message":"#,
    r#"["not","a","record"]"#,
];

/// Decode `lines` the way the feeds do, dropping anything undecodable.
pub fn decode_lines(lines: &[&str]) -> Vec<emulog_core::LogRecord> {
    lines
        .iter()
        .filter_map(|line| emulog_feeds::decode_line(line).ok().flatten())
        .collect()
}

/// `SESSION` with `NOISE` interleaved, one entry per line.
pub fn noisy_session() -> String {
    let mut lines = Vec::new();
    for (i, line) in SESSION.iter().enumerate() {
        lines.push(*line);
        if let Some(noise) = NOISE.get(i) {
            lines.push(noise);
        }
    }
    lines.join("\n") + "\n"
}

/// Write `lines` (newline-terminated) to `name` under `dir`.
pub fn write_log(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).expect("create fixture log");
    for line in lines {
        writeln!(file, "{line}").expect("write fixture line");
    }
    path
}
