//! Test builders for [`LogRecord`] values.
//!
//! These favour readability in assertions and panic on bad input rather than
//! returning `Result`.

use emulog_core::LogRecord;
use serde_json::{Map, Value};

/// Fluent builder for emulator log records.
///
/// ```rust
/// let record = RecordBuilder::new("Beginning execution")
///     .level("info")
///     .emulator("functions")
///     .function("us-central1-hello")
///     .user(json!({"order": {"id": 7}}))
///     .build();
/// ```
pub struct RecordBuilder {
    level: String,
    message: String,
    timestamp: i64,
    user: Option<Value>,
    metadata: Map<String, Value>,
}

impl RecordBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            level: "info".to_string(),
            message: message.into(),
            timestamp: 1_700_000_000_000,
            user: None,
            metadata: Map::new(),
        }
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn timestamp(mut self, millis: i64) -> Self {
        self.timestamp = millis;
        self
    }

    pub fn user(mut self, payload: Value) -> Self {
        self.user = Some(payload);
        self
    }

    pub fn emulator(mut self, name: &str) -> Self {
        self.metadata
            .insert("emulator".into(), serde_json::json!({ "name": name }));
        self
    }

    pub fn function(mut self, name: &str) -> Self {
        self.metadata
            .insert("function".into(), serde_json::json!({ "name": name }));
        self
    }

    pub fn build(self) -> LogRecord {
        let mut record = LogRecord::new(self.level, self.message, self.timestamp);
        if let Some(user) = self.user {
            record.data.insert("user".into(), user);
        }
        if !self.metadata.is_empty() {
            record
                .data
                .insert("metadata".into(), Value::Object(self.metadata));
        }
        record
    }
}

/// A plain record with a level and message and no data.
pub fn record(level: &str, message: &str) -> LogRecord {
    RecordBuilder::new(message).level(level).build()
}

/// A `user`-level record carrying `payload` as its user data.
pub fn user_record(message: &str, payload: Value) -> LogRecord {
    RecordBuilder::new(message).level("user").user(payload).build()
}

/// `n` records cycling through the emulators and levels of a typical
/// `firebase emulators:start` session.
pub fn build_corpus(n: usize) -> Vec<LogRecord> {
    const EMULATORS: [&str; 3] = ["functions", "firestore", "hub"];
    (0..n)
        .map(|i| {
            let level = match i % 10 {
                0 => "error",
                1 | 2 => "warn",
                3 | 4 => "user",
                _ => "info",
            };
            RecordBuilder::new(format!("log line {i}"))
                .level(level)
                .timestamp(1_700_000_000_000 + i as i64)
                .emulator(EMULATORS[i % EMULATORS.len()])
                .user(serde_json::json!({ "seq": i, "even": i % 2 == 0 }))
                .build()
        })
        .collect()
}
