//! Ratatui widgets for the emulog TUI.

pub mod command_bar;
pub mod help;
pub mod json_view;
pub mod log_stream;
pub mod query_bar;
pub mod text_input;
