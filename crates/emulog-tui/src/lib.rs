//! emulog TUI: ratatui application shell.
//!
//! Three stacked panes: the filtered log stream, the JSON detail of the
//! selected record, and the query bar. Selecting a key or value in the detail
//! pane rewrites the query, which re-filters the stream.

pub mod app;
pub mod commands;
pub mod event;
pub mod theme;
pub mod widgets;

pub use app::{App, AppState};

use emulog_core::{config::Config, LogRecord};
use tokio::sync::mpsc::UnboundedReceiver;

/// Run the TUI until the user quits. Blocks the calling thread.
pub fn run(
    config: Config,
    records: UnboundedReceiver<LogRecord>,
    source: impl Into<String>,
    initial_query: &str,
) -> anyhow::Result<()> {
    let theme = theme::Theme::by_name(&config.ui.theme);
    let state = AppState::new(config, theme, source, initial_query);
    App::new(state, records).run()
}
