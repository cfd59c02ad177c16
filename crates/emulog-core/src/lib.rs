//! emulog-core: query language, match engine and JSON hierarchy renderer.
//!
//! Everything in this crate is synchronous and UI-agnostic. The feeds crate
//! produces [`LogRecord`]s, the TUI owns a [`LogHistory`] and re-filters it
//! whenever the query text changes.
//!
//! # Pipeline
//!
//! ```text
//! query text ──► tokenizer ──► StructuredFilter ──► matcher ──► visible rows
//!                                     ▲                            │
//!                                     └── append_filter ◄── hierarchy (click)
//! ```

pub mod accessor;
pub mod coerce;
pub mod config;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod history;
pub mod matcher;
pub mod tokenizer;
pub mod types;

pub use accessor::AccessorCache;
pub use error::PathError;
pub use filter::{append_filter, filters_to_query_string, FilterValue, StructuredFilter};
pub use hierarchy::{render_hierarchy, ClickAction, JsonLine};
pub use history::LogHistory;
pub use matcher::is_query_match;
pub use tokenizer::{parse_query, ParsedQuery, Token};
pub use types::{LogLevel, LogRecord};
