//! Error types for emulog-core.
//!
//! Query handling never surfaces errors to callers; these types exist so the
//! places that swallow a failure can log exactly what went wrong.

use thiserror::Error;

/// Why a property path could not be compiled into an accessor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("expected identifier at offset {0}")]
    ExpectedIdentifier(usize),
    #[error("unexpected character {found:?} at offset {offset}")]
    Unexpected { offset: usize, found: char },
    #[error("unterminated bracket starting at offset {0}")]
    UnterminatedBracket(usize),
    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),
    #[error("invalid escape sequence at offset {0}")]
    InvalidEscape(usize),
}
