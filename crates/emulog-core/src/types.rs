//! Core types for emulog-core.
//!
//! This module defines the record shape pushed by the emulator hub's logging
//! stream ([`LogRecord`]) and the [`LogLevel`] used to colour it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single decoded log record from the emulator logging stream.
///
/// Records are immutable once received. `data` carries structured context;
/// user-emitted payloads live under `data.user` and emulator metadata under
/// `data.metadata` (`metadata.emulator.name`, `metadata.function.name`, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Level string exactly as emitted (e.g. `"info"`, `"WARN"`, `"user"`).
    pub level: String,
    /// Human-readable message.
    pub message: String,
    /// Structured context. Defaults to an empty object when absent.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl LogRecord {
    pub fn new(level: impl Into<String>, message: impl Into<String>, timestamp: i64) -> Self {
        Self {
            level: level.into(),
            message: message.into(),
            data: Map::new(),
            timestamp,
        }
    }

    /// The user payload (`data.user`), if the record carries one.
    pub fn user(&self) -> Option<&Value> {
        self.data.get("user")
    }

    /// Best-effort severity for colouring. Filtering always uses the raw
    /// `level` string.
    pub fn severity(&self) -> Option<LogLevel> {
        LogLevel::parse(&self.level)
    }

    /// The record as a JSON value, the shape the matcher resolves paths against.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::with_capacity(4);
        obj.insert("level".to_string(), Value::String(self.level.clone()));
        obj.insert("message".to_string(), Value::String(self.message.clone()));
        obj.insert("data".to_string(), Value::Object(self.data.clone()));
        obj.insert("timestamp".to_string(), Value::from(self.timestamp));
        Value::Object(obj)
    }
}

/// Log severity level, normalised across emulators.
///
/// `System` and `User` are emitted by the emulator hub for its own lifecycle
/// messages and for `console.log` output from functions respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    User,
    System,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// Case-insensitive parse; returns `None` for unknown levels.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" | "silly" => Some(LogLevel::Trace),
            "debug" | "verbose" => Some(LogLevel::Debug),
            "info" | "log" | "success" => Some(LogLevel::Info),
            "user" => Some(LogLevel::User),
            "system" => Some(LogLevel::System),
            "warn" | "warning" | "warn_once" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            "fatal" | "critical" => Some(LogLevel::Fatal),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::User => write!(f, "USER"),
            LogLevel::System => write!(f, "SYSTEM"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Fatal => write!(f, "FATAL"),
        }
    }
}
