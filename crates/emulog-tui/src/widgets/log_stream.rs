//! Log stream widget: the scrollable live-tail list of matching records.
//!
//! # Scroll semantics
//!
//! The state holds `visible`, the history indices matching the current query.
//! `scroll_offset` = number of visible records hidden at the bottom (0 = live
//! tail). `cursor` = position within `visible`. Records arriving while paused
//! grow `scroll_offset` so the view does not move under the reader.

use std::cell::Cell;

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use chrono::{DateTime, Utc};
use emulog_core::{LogHistory, LogRecord};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};

const PAGE_STEP: usize = 10;

pub struct LogStreamState {
    /// History indices of the records matching the current query, oldest first.
    pub visible: Vec<usize>,
    /// Number of visible records hidden at the bottom (0 = live tail).
    pub scroll_offset: usize,
    /// Position within `visible` of the highlighted record.
    pub cursor: usize,
    /// When true, new records do not advance the view.
    pub paused: bool,
    /// Count of matching records that arrived while paused.
    pub buffered_new: usize,
    pub show_timestamps: bool,
    /// `chrono` format string for the timestamp column.
    pub timestamp_format: String,
    /// Rows available at the last draw; paging needs it between frames.
    last_height: Cell<usize>,
}

impl Default for LogStreamState {
    fn default() -> Self {
        Self::new(true, "%H:%M:%S%.3f")
    }
}

impl LogStreamState {
    pub fn new(show_timestamps: bool, timestamp_format: impl Into<String>) -> Self {
        Self {
            visible: Vec::new(),
            scroll_offset: 0,
            cursor: 0,
            paused: false,
            buffered_new: 0,
            show_timestamps,
            timestamp_format: timestamp_format.into(),
            last_height: Cell::new(40),
        }
    }

    fn height(&self) -> usize {
        self.last_height.get().max(1)
    }

    /// Returns `(start, end)`, the exclusive range of `visible` on screen.
    fn visible_range(&self) -> (usize, usize) {
        let end = self.visible.len().saturating_sub(self.scroll_offset);
        let start = end.saturating_sub(self.height());
        (start, end)
    }

    /// History index of the highlighted record.
    pub fn selected(&self) -> Option<usize> {
        self.visible.get(self.cursor).copied()
    }

    /// Replace the match set after the query changed.
    ///
    /// While live-tailing the cursor follows the newest record. While paused
    /// the cursor stays on the same record if it still matches, otherwise on
    /// the nearest older one.
    pub fn set_visible(&mut self, visible: Vec<usize>) {
        let previous = self.selected();
        self.visible = visible;
        self.buffered_new = 0;

        match previous.filter(|_| self.paused) {
            Some(prev) => {
                let pos = self.visible.partition_point(|&i| i <= prev);
                self.cursor = pos.saturating_sub(1);
                self.scroll_offset = self.visible.len().saturating_sub(self.cursor + 1);
            }
            None => self.to_tail(),
        }
        tracing::debug!(
            visible = self.visible.len(),
            cursor = self.cursor,
            paused = self.paused,
            "stream: match set replaced"
        );
    }

    /// Append newly matched history indices.
    pub fn extend_visible(&mut self, new: &[usize]) {
        if new.is_empty() {
            return;
        }
        self.visible.extend_from_slice(new);
        if self.paused {
            self.scroll_offset += new.len();
            self.buffered_new += new.len();
        } else {
            self.cursor = self.visible.len() - 1;
        }
    }

    fn to_tail(&mut self) {
        self.scroll_offset = 0;
        self.cursor = self.visible.len().saturating_sub(1);
        self.paused = false;
        self.buffered_new = 0;
    }

    /// Moving or paging up pauses the tail. Reaching the newest record
    /// again, or `ScrollToTail`, resumes it.
    pub fn handle(&mut self, event: &AppEvent) {
        let total = self.visible.len();
        if total == 0 {
            return;
        }
        match event {
            AppEvent::Nav(Direction::Up) => {
                self.paused = true;
                self.cursor = self.cursor.saturating_sub(1);
                if self.cursor < self.visible_range().0 {
                    self.scroll_offset = total.saturating_sub(self.cursor + self.height());
                }
            }
            AppEvent::Nav(Direction::Down) => {
                self.cursor = (self.cursor + 1).min(total - 1);
                if self.cursor >= self.visible_range().1 {
                    self.scroll_offset = self.scroll_offset.saturating_sub(1);
                }
                if self.scroll_offset == 0 && self.cursor == total - 1 {
                    self.to_tail();
                }
            }
            AppEvent::ScrollUp => {
                self.paused = true;
                self.scroll_offset = (self.scroll_offset + PAGE_STEP).min(total - 1);
                self.cursor = self.visible_range().1.saturating_sub(1);
            }
            AppEvent::ScrollDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(PAGE_STEP);
                self.cursor = self.visible_range().1.saturating_sub(1);
                if self.scroll_offset == 0 {
                    self.to_tail();
                }
            }
            AppEvent::ScrollToTail => self.to_tail(),
            _ => return,
        }
        tracing::trace!(
            cursor = self.cursor,
            scroll_offset = self.scroll_offset,
            paused = self.paused,
            "stream moved"
        );
    }
}

pub struct LogStream<'a> {
    state: &'a LogStreamState,
    history: &'a LogHistory,
    /// Lower-cased search term to highlight in messages.
    highlight: Option<&'a str>,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> LogStream<'a> {
    pub fn new(state: &'a LogStreamState, history: &'a LogHistory, focused: bool, theme: &'a Theme) -> Self {
        Self { state, history, highlight: None, focused, theme }
    }

    pub fn highlight(mut self, term: Option<&'a str>) -> Self {
        self.highlight = term.filter(|t| !t.is_empty());
        self
    }
}

impl Widget for LogStream<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border.focused
        } else {
            self.theme.border.unfocused
        };

        let title = format!("Logs {}/{}", self.state.visible.len(), self.history.len());
        let block = Block::bordered().title(title).border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let height = inner.height as usize;
        // Cache for handle(); draw always runs before handle()
        self.state.last_height.set(height);

        let total = self.state.visible.len();
        let end = total.saturating_sub(self.state.scroll_offset);
        let start = end.saturating_sub(height);

        let cursor_row = (self.state.cursor >= start && self.state.cursor < end)
            .then(|| self.state.cursor - start);

        let mut lines: Vec<Line<'static>> = self.state.visible[start..end]
            .iter()
            .enumerate()
            .filter_map(|(row, &idx)| {
                let record = self.history.get(idx)?;
                let mut line = render_record(record, &self.state, self.highlight, self.theme);
                if Some(row) == cursor_row {
                    let modifier = if self.focused { Modifier::REVERSED } else { Modifier::BOLD };
                    line = line.patch_style(Style::default().add_modifier(modifier));
                }
                Some(line)
            })
            .collect();

        // Paused: the banner takes the top row.
        if self.state.paused {
            let msg = if self.state.buffered_new > 0 {
                format!(" ⏸  paused, {} new records (G to resume) ", self.state.buffered_new)
            } else {
                " ⏸  paused  (G to resume) ".to_string()
            };
            let banner = Line::from(Span::styled(
                msg,
                Style::default()
                    .bg(Color::DarkGray)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
            if lines.is_empty() {
                lines.push(banner);
            } else {
                lines[0] = banner;
            }
        }

        // The scrollbar strip sits inside the borders so the track height
        // equals the number of visible rows.
        let text_area = Rect { width: inner.width.saturating_sub(1), ..inner };
        let sb_area = Rect {
            x: inner.right().saturating_sub(1),
            width: 1,
            ..inner
        };

        Paragraph::new(lines).render(text_area, buf);

        if total > 0 {
            let mut sb_state = ScrollbarState::new(total)
                .position(start)
                .viewport_content_length(height);
            StatefulWidget::render(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(None)
                    .end_symbol(None),
                sb_area,
                buf,
                &mut sb_state,
            );
        }
    }
}

fn render_record(
    record: &LogRecord,
    state: &LogStreamState,
    highlight: Option<&str>,
    theme: &Theme,
) -> Line<'static> {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let mut spans: Vec<Span<'static>> = Vec::new();

    if state.show_timestamps {
        let ts = DateTime::<Utc>::from_timestamp_millis(record.timestamp)
            .map(|t| t.format(&state.timestamp_format).to_string())
            .unwrap_or_else(|| record.timestamp.to_string());
        spans.push(Span::styled(format!("{ts} "), dim));
    }

    let level_style = theme.level_style(record.severity());
    spans.push(Span::styled(format!("{:<6} ", record.level.to_ascii_uppercase()), level_style));

    let emulator = emulator_name(record).unwrap_or("");
    spans.push(Span::styled(format!("{emulator:<10} "), theme.emulator_style(emulator)));
    spans.push(Span::styled("│ ".to_string(), dim));

    spans.extend(highlight_spans(&record.message, highlight, level_style, theme.search.highlight));
    Line::from(spans)
}

fn emulator_name(record: &LogRecord) -> Option<&str> {
    record.data.get("metadata")?.get("emulator")?.get("name")?.as_str()
}

/// Split `text` into spans, styling case-insensitive occurrences of `term`.
fn highlight_spans(text: &str, term: Option<&str>, base: Style, hit: Style) -> Vec<Span<'static>> {
    let Some(term) = term else {
        return vec![Span::styled(text.to_string(), base)];
    };
    let lower = text.to_lowercase();
    // Lower-casing can change byte lengths outside ASCII; offsets would not
    // map back onto `text`.
    if lower.len() != text.len() {
        return vec![Span::styled(text.to_string(), base)];
    }

    let mut spans = Vec::new();
    let mut cursor = 0;
    for (start, matched) in lower.match_indices(term) {
        if start > cursor {
            spans.push(Span::styled(text[cursor..start].to_string(), base));
        }
        let end = start + matched.len();
        spans.push(Span::styled(text[start..end].to_string(), hit));
        cursor = end;
    }
    if cursor < text.len() {
        spans.push(Span::styled(text[cursor..].to_string(), base));
    }
    spans
}
