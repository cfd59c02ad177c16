//! The `:` prompt drawn over the bottom row. `Enter` hands the text to
//! [`crate::commands::Command::parse`]; a failed command leaves its message in
//! place of the prompt until the next key.

use super::text_input::TextInput;
use crate::event::AppEvent;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Clear, Widget},
};

#[derive(Debug, Default)]
pub struct CommandBarState {
    /// The text typed after the `:` prefix.
    pub input: TextInput,
    /// Error from the last failed command, cleared on the next key.
    pub error: Option<String>,
}

impl CommandBarState {
    /// Call when opening the bar.
    pub fn clear(&mut self) {
        self.input.clear();
        self.error = None;
    }

    pub fn handle(&mut self, event: &AppEvent) {
        self.error = None;
        self.input.apply(event);
    }

    /// Absolute terminal column of the text cursor; the `:` glyph takes the
    /// first cell.
    pub fn cursor_col(&self, area: Rect) -> u16 {
        let col = 1 + self.input.column() as u16;
        (area.x + col).min(area.right().saturating_sub(1))
    }
}

/// Draws into a one-row area, clearing it first.
pub struct CommandBar<'a> {
    state: &'a CommandBarState,
    theme: &'a Theme,
}

impl<'a> CommandBar<'a> {
    pub fn new(state: &'a CommandBarState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }
}

impl Widget for CommandBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let line = match &self.state.error {
            Some(err) => Line::styled(format!("E  {err}"), self.theme.levels.error),
            None => Line::from(vec![
                Span::styled(":", self.theme.border.command_bar.add_modifier(Modifier::BOLD)),
                Span::raw(self.state.input.as_str()),
            ]),
        };
        line.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Direction;

    #[test]
    fn edits_and_cursor_column() {
        let mut s = CommandBarState::default();
        for c in "thme".chars() {
            s.handle(&AppEvent::Char(c));
        }
        for _ in 0..2 {
            s.handle(&AppEvent::Nav(Direction::Left));
        }
        s.handle(&AppEvent::Char('e'));
        assert_eq!(s.input.as_str(), "theme");
        assert_eq!(s.cursor_col(Rect::new(2, 0, 80, 1)), 6);
    }

    #[test]
    fn any_key_dismisses_error() {
        let mut s = CommandBarState {
            error: Some("unknown command: x".into()),
            ..Default::default()
        };
        s.handle(&AppEvent::Backspace);
        assert!(s.error.is_none());
    }

    #[test]
    fn clear_resets_input() {
        let mut s = CommandBarState::default();
        s.input.set("quit");
        s.clear();
        assert_eq!(s.input.as_str(), "");
        assert_eq!(s.cursor_col(Rect::new(0, 0, 10, 1)), 1);
    }
}
