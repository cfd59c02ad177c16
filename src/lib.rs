//! emulog: terminal explorer for Firebase Local Emulator Suite logs.
//!
//! The binary wires a record feed (stdin or a file) to either the TUI or the
//! headless filter. This library half exposes the CLI definition and the
//! headless mode so integration tests can drive them directly.
//!
//! # Architecture
//!
//! ```text
//! feed (stdin | file) ──mpsc──► TUI: history ─► query ─► stream / detail
//!                          └──► headless: query ─► NDJSON on stdout
//! ```

pub mod cli;
pub mod headless;

pub use cli::Cli;
