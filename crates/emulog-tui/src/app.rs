//! Top-level application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, drains
//! the record channel once per tick, and tears everything down cleanly on
//! exit or panic.

use crate::{
    commands::{execute_command, Command},
    event::{AppEvent, Keymap},
    theme::Theme,
    widgets::{
        command_bar::{CommandBar, CommandBarState},
        help::HelpPopup,
        json_view::{JsonView, JsonViewState},
        log_stream::{LogStream, LogStreamState},
        query_bar::{QueryBar, QueryBarState},
    },
};
use crossterm::{
    event::{self as ct_event, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use emulog_core::{append_filter, config::Config, AccessorCache, ClickAction, LogHistory, LogRecord};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc::{error::TryRecvError, UnboundedReceiver};

/// Upper bound on records ingested per tick so input stays responsive
/// under a burst.
const MAX_RECORDS_PER_TICK: usize = 5_000;
const TICK: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Stream,
    Detail,
    QueryBar,
    /// Vim-style `:` command line is active.
    Command,
}

pub struct AppState {
    pub history: LogHistory,
    /// Shared by the matcher and the detail renderer for the whole session.
    pub cache: AccessorCache,
    pub stream: LogStreamState,
    pub detail: JsonViewState,
    pub query: QueryBarState,
    pub focus: Focus,
    /// Focus state before entering command mode, restored on exit.
    pub prev_focus: Focus,
    pub theme: Theme,
    pub config: Config,
    pub keymap: Keymap,
    pub show_help: bool,
    pub command_bar: CommandBarState,
    /// Label of the record source for the status line.
    pub source: String,
    /// Set once the feed has hung up.
    pub source_closed: bool,
    pub quit: bool,
}

impl AppState {
    pub fn new(config: Config, theme: Theme, source: impl Into<String>, initial_query: &str) -> Self {
        let keymap = Keymap::from_config(&config.keybindings);
        let stream = LogStreamState::new(config.ui.show_timestamps, config.ui.timestamp_format.clone());
        let mut state = Self {
            history: LogHistory::new(),
            cache: AccessorCache::new(),
            stream,
            detail: JsonViewState::default(),
            query: QueryBarState::default(),
            focus: Focus::Stream,
            prev_focus: Focus::Stream,
            theme,
            config,
            keymap,
            show_help: false,
            command_bar: CommandBarState::default(),
            source: source.into(),
            source_closed: false,
            quit: false,
        };
        state.set_query(initial_query);
        state
    }

    /// Replace the query text and re-filter.
    pub fn set_query(&mut self, query: &str) {
        self.query.set_query(query);
        self.refilter();
    }

    /// Re-evaluate the whole history against the current query.
    pub fn refilter(&mut self) {
        let visible = self.history.matching_indices(&self.query.parsed.filters, &mut self.cache);
        tracing::debug!(matched = visible.len(), total = self.history.len(), "refiltered");
        self.stream.set_visible(visible);
        self.sync_detail();
    }

    /// Append records and match only the new ones.
    pub fn ingest(&mut self, records: impl IntoIterator<Item = LogRecord>) {
        let start = self.history.len();
        self.history.extend(records);
        if self.history.len() == start {
            return;
        }
        let new = self.history.matching_from(start, &self.query.parsed.filters, &mut self.cache);
        self.stream.extend_visible(&new);
        self.sync_detail();
    }

    /// Point the detail pane at the stream selection.
    fn sync_detail(&mut self) {
        let selected = self
            .stream
            .selected()
            .and_then(|i| self.history.get(i).map(|r| (i, r)));
        self.detail.show(selected, &mut self.cache);
    }

    /// Append `action` to the query as a `path=value` pair.
    pub fn apply_click(&mut self, action: &ClickAction) {
        let query = append_filter(self.query.text(), &action.path, action.value.clone());
        tracing::debug!(path = %action.path, value = %action.value, query = %query, "click-to-filter");
        self.set_query(&query);
    }

    fn drain(&mut self, rx: &mut UnboundedReceiver<LogRecord>) {
        let mut batch = Vec::new();
        while batch.len() < MAX_RECORDS_PER_TICK {
            match rx.try_recv() {
                Ok(record) => batch.push(record),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.source_closed {
                        tracing::info!(source = %self.source, "record source closed");
                    }
                    self.source_closed = true;
                    break;
                }
            }
        }
        if !batch.is_empty() {
            self.ingest(batch);
        }
    }
}

pub struct App {
    state: AppState,
    records: UnboundedReceiver<LogRecord>,
}

type Term = Terminal<CrosstermBackend<Stdout>>;

impl App {
    pub fn new(state: AppState, records: UnboundedReceiver<LogRecord>) -> Self {
        App { state, records }
    }

    /// Run until quit. The terminal is restored on return, error or panic.
    pub fn run(mut self) -> anyhow::Result<()> {
        let mut session = TerminalSession::enter()?;
        self.event_loop(&mut session.terminal)
    }

    fn event_loop(&mut self, terminal: &mut Term) -> anyhow::Result<()> {
        while !self.state.quit {
            self.state.drain(&mut self.records);
            let s = &self.state;
            terminal.draw(|frame| draw(frame, s))?;

            if !ct_event::poll(TICK)? {
                continue;
            }
            let raw = match ct_event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Press => continue,
                raw => raw,
            };
            let mapped = if is_insert_mode(self.state.focus) {
                self.state.keymap.to_app_event_insert(raw)
            } else {
                self.state.keymap.to_app_event(raw)
            };
            if let Some(ev) = mapped {
                tracing::trace!(focus = ?self.state.focus, event = ?ev, "input");
                handle(&mut self.state, ev);
            }
        }
        Ok(())
    }
}

/// Apply one event to the application state.
pub fn handle(s: &mut AppState, event: AppEvent) {
    // Help popup intercepts all events; only close keys pass through.
    if s.show_help {
        if matches!(event, AppEvent::Char('?') | AppEvent::Escape | AppEvent::Quit) {
            tracing::debug!("help popup closed");
            s.show_help = false;
        }
        return;
    }

    if s.focus == Focus::Command {
        handle_command_bar(s, event);
        return;
    }

    match event {
        AppEvent::Char('?') if s.focus != Focus::QueryBar => {
            tracing::debug!("help popup opened");
            s.show_help = true;
        }

        AppEvent::Char(':') if s.focus != Focus::QueryBar => {
            tracing::debug!(prev_focus = ?s.focus, "entering command mode");
            s.prev_focus = s.focus;
            s.command_bar.clear();
            s.focus = Focus::Command;
        }

        AppEvent::Quit => {
            tracing::debug!("quit");
            s.quit = true;
        }

        AppEvent::Escape if s.focus == Focus::QueryBar => {
            s.focus = s.prev_focus;
        }

        AppEvent::Enter if s.focus == Focus::QueryBar => {
            s.focus = s.prev_focus;
        }

        AppEvent::FocusNext => {
            let next = match s.focus {
                Focus::Stream => Focus::Detail,
                Focus::Detail => Focus::Stream,
                Focus::QueryBar | Focus::Command => s.prev_focus,
            };
            tracing::debug!(from = ?s.focus, to = ?next, "focus cycle");
            s.focus = next;
        }

        AppEvent::QueryFocus => {
            tracing::debug!("focus -> QueryBar");
            if s.focus != Focus::QueryBar {
                s.prev_focus = s.focus;
            }
            s.focus = Focus::QueryBar;
        }

        AppEvent::ClearQuery => s.set_query(""),

        AppEvent::ScrollToTail => {
            s.stream.handle(&AppEvent::ScrollToTail);
            s.sync_detail();
        }

        AppEvent::Enter if s.focus == Focus::Detail => {
            if let Some(action) = s.detail.primary_action().cloned() {
                s.apply_click(&action);
            }
        }

        AppEvent::FilterKey if s.focus == Focus::Detail => {
            if let Some(action) = s.detail.key_action().cloned() {
                s.apply_click(&action);
            }
        }

        // Terminal resize is handled automatically by ratatui
        AppEvent::Resize(_, _) => {}

        other => dispatch_to_focused(s, other),
    }
}

fn handle_command_bar(s: &mut AppState, event: AppEvent) {
    match event {
        AppEvent::Escape => {
            tracing::debug!("command bar cancelled");
            s.command_bar.clear();
            s.focus = s.prev_focus;
        }
        AppEvent::Enter => match Command::parse(s.command_bar.input.as_str()) {
            Ok(cmd) => {
                s.command_bar.clear();
                s.focus = s.prev_focus;
                if let Some(cmd) = cmd {
                    tracing::debug!(command = ?cmd, "running command");
                    execute_command(s, cmd);
                }
            }
            Err(msg) => s.command_bar.error = Some(msg),
        },
        AppEvent::Quit => s.quit = true,
        other => s.command_bar.handle(&other),
    }
}

/// Returns true when the current focus is on a text-input widget, meaning
/// alphabetic keys should produce characters rather than trigger shortcuts.
fn is_insert_mode(focus: Focus) -> bool {
    matches!(focus, Focus::QueryBar | Focus::Command)
}

/// Route an event to the widget that owns the current focus.
fn dispatch_to_focused(s: &mut AppState, event: AppEvent) {
    match s.focus {
        Focus::Stream => {
            s.stream.handle(&event);
            s.sync_detail();
        }
        Focus::Detail => s.detail.handle(&event),
        Focus::QueryBar => {
            if s.query.handle(&event) {
                s.refilter();
            }
        }
        Focus::Command => {} // handled before dispatch
    }
}

fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    // Vertical: body | 3-line query bar | 1-line status
    let vert = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    let pct = state.config.ui.detail_pane_height_pct.min(90);
    let body = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([Constraint::Percentage(100 - pct), Constraint::Percentage(pct)])
        .split(vert[0]);

    let search = state.query.parsed.filters.search().map(|s| s.to_lowercase());
    frame.render_widget(
        LogStream::new(&state.stream, &state.history, state.focus == Focus::Stream, &state.theme)
            .highlight(search.as_deref()),
        body[0],
    );
    frame.render_widget(JsonView::new(&state.detail, state.focus == Focus::Detail, &state.theme), body[1]);
    frame.render_widget(
        QueryBar::new(&state.query, state.focus == Focus::QueryBar, &state.theme),
        vert[1],
    );
    frame.render_widget(status_line(state), vert[2]);

    if state.show_help {
        frame.render_widget(HelpPopup::new(&state.theme, &state.config.keybindings), area);
    }

    // Command bar overlays the bottom row of the screen
    if state.focus == Focus::Command {
        let cmd_area = Rect { y: area.bottom().saturating_sub(1), height: 1, ..area };
        frame.render_widget(CommandBar::new(&state.command_bar, &state.theme), cmd_area);
        let col = state.command_bar.cursor_col(cmd_area);
        frame.set_cursor_position((col, cmd_area.y));
        return;
    }

    if state.focus == Focus::QueryBar {
        let qb = QueryBar::new(&state.query, true, &state.theme);
        frame.set_cursor_position(qb.cursor_position(vert[1]));
    }
}

fn status_line(state: &AppState) -> Line<'_> {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let source = if state.source_closed {
        format!(" {} (ended)", state.source)
    } else {
        format!(" {}", state.source)
    };
    Line::from(vec![
        Span::styled(source, dim),
        Span::styled(
            format!("  {} records  {} cached paths  ? help", state.history.len(), state.cache.len()),
            dim,
        ),
    ])
}

/// Raw mode plus the alternate screen, undone on drop. Also installs a panic
/// hook so a panic message lands on a usable terminal.
struct TerminalSession {
    terminal: Term,
}

impl TerminalSession {
    fn enter() -> anyhow::Result<Self> {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore_terminal();
        if let Err(err) = self.terminal.show_cursor() {
            tracing::warn!(%err, "could not show cursor");
        }
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}
