//! Query bar: the filter text, coloured per token as it is typed.
//!
//! Line breaks (`Shift+Enter`) are kept in the text and drawn as a glyph so
//! the bar stays one row tall. [`QueryBarState::handle`] reports whether the
//! text changed so the app can refilter.

use super::text_input::{Edit, TextInput};
use crate::event::AppEvent;
use crate::theme::Theme;
use emulog_core::{parse_query, ParsedQuery, Token};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

/// Shown in place of a line break so the query stays on one row.
const NEWLINE_GLYPH: &str = "↵";

#[derive(Debug, Default)]
pub struct QueryBarState {
    pub input: TextInput,
    /// Tokens and filters of the input, kept in sync on every edit.
    pub parsed: ParsedQuery,
}

impl QueryBarState {
    pub fn new(query: &str) -> Self {
        let mut state = Self::default();
        state.set_query(query);
        state
    }

    pub fn text(&self) -> &str {
        self.input.as_str()
    }

    /// Replace the whole query and move the cursor to the end.
    pub fn set_query(&mut self, query: &str) {
        self.input.set(query);
        self.reparse();
    }

    fn reparse(&mut self) {
        self.parsed = parse_query(self.text());
        tracing::debug!(
            query = %self.text(),
            filters = self.parsed.filters.len(),
            invalid = self.parsed.invalid_pairs().count(),
            "query: reparsed"
        );
    }

    /// Handle a key event; returns `true` when the query text changed.
    pub fn handle(&mut self, event: &AppEvent) -> bool {
        let changed = self.input.apply(event) == Edit::Changed;
        if changed {
            self.reparse();
        }
        changed
    }
}

pub struct QueryBar<'a> {
    state: &'a QueryBarState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> QueryBar<'a> {
    pub fn new(state: &'a QueryBarState, focused: bool, theme: &'a Theme) -> Self {
        Self { state, focused, theme }
    }

    /// Where the terminal cursor goes when the bar is drawn into `area`.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        // Borders are one cell wide; the newline glyph is one cell like any char.
        let col = self.state.input.column() as u16;
        let x = (area.x + 1 + col).min(area.right().saturating_sub(1));
        (x, area.y + 1)
    }

    fn token_spans(&self) -> Vec<Span<'a>> {
        let theme = self.theme;
        let mut spans = Vec::with_capacity(self.state.parsed.tokens.len() * 3);
        for token in &self.state.parsed.tokens {
            match token {
                Token::Text { raw } => spans.push(Span::styled(raw.as_str(), theme.query.text)),
                Token::InvalidPair { raw } => spans.push(Span::styled(raw.as_str(), theme.query.invalid)),
                Token::Newline => spans.push(Span::styled(NEWLINE_GLYPH, theme.query.text)),
                Token::Pair { raw, key, raw_value, .. }
                    if raw.starts_with(key.as_str()) && raw.ends_with(raw_value.as_str()) =>
                {
                    let value_start = raw.len() - raw_value.len();
                    spans.push(Span::styled(&raw[..key.len()], theme.query.key));
                    spans.push(Span::styled(&raw[key.len()..value_start], theme.query.text));
                    spans.push(Span::styled(&raw[value_start..], theme.query.value));
                }
                Token::Pair { raw, .. } => spans.push(Span::styled(raw.as_str(), theme.query.key)),
            }
        }
        spans
    }
}

impl Widget for QueryBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border.focused
        } else {
            self.theme.border.unfocused
        };

        let block = Block::bordered().title("Query").border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        // Query text (fill) | filter summary (fixed width)
        let chunks = Layout::default()
            .direction(LayoutDir::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Length(24)])
            .split(inner);

        let query_line = if self.state.text().is_empty() && !self.focused {
            Line::from(Span::styled(
                "press / to filter",
                Style::default().add_modifier(Modifier::DIM),
            ))
        } else {
            Line::from(self.token_spans())
        };
        Paragraph::new(query_line).render(chunks[0], buf);

        let filters = self.state.parsed.filters.len();
        let invalid = self.state.parsed.invalid_pairs().count();
        let mut summary = vec![Span::styled(
            format!("{filters} filter{}", if filters == 1 { "" } else { "s" }),
            Style::default().add_modifier(Modifier::DIM),
        )];
        if invalid > 0 {
            summary.push(Span::styled(format!(" {invalid} invalid"), self.theme.query.invalid));
        }
        Paragraph::new(Line::from(summary)).render(chunks[1], buf);
    }
}
