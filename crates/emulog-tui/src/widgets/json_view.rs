//! Detail pane: the selected record's `user` payload as annotated JSON.
//!
//! Each line comes from [`render_hierarchy`], so every key and leaf value
//! knows the filter path it stands for. The line cursor picks a line;
//! `Enter` appends its primary action (value if it has one, key presence
//! otherwise) to the query and the filter-key binding appends the key
//! action.

use std::cell::Cell;

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use emulog_core::hierarchy::JsonLine;
use emulog_core::{render_hierarchy, AccessorCache, ClickAction, LogRecord};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

#[derive(Debug, Default)]
pub struct JsonViewState {
    /// History index of the record on display.
    pub record: Option<usize>,
    pub lines: Vec<JsonLine>,
    pub cursor: usize,
    /// First line on screen.
    pub scroll: usize,
    last_height: Cell<usize>,
}

impl JsonViewState {
    /// Show `record` (history index `index`), or clear the pane.
    pub fn show(&mut self, selected: Option<(usize, &LogRecord)>, cache: &mut AccessorCache) {
        if selected.map(|(i, _)| i) == self.record {
            return;
        }
        self.cursor = 0;
        self.scroll = 0;
        match selected {
            Some((index, record)) => {
                self.record = Some(index);
                self.lines = record
                    .user()
                    .map(|user| render_hierarchy(user, cache))
                    .unwrap_or_default();
                // Land on the first selectable line.
                self.cursor = self
                    .lines
                    .iter()
                    .position(|l| l.primary_action().is_some())
                    .unwrap_or(0);
            }
            None => {
                self.record = None;
                self.lines.clear();
            }
        }
    }

    pub fn current(&self) -> Option<&JsonLine> {
        self.lines.get(self.cursor)
    }

    /// The action for `Enter`.
    pub fn primary_action(&self) -> Option<&ClickAction> {
        self.current()?.primary_action()
    }

    /// The action for the filter-key binding.
    pub fn key_action(&self) -> Option<&ClickAction> {
        self.current()?.key_action()
    }

    pub fn handle(&mut self, event: &AppEvent) {
        if self.lines.is_empty() {
            return;
        }
        let last = self.lines.len() - 1;
        let page = self.last_height.get().max(1);
        self.cursor = match event {
            AppEvent::Nav(Direction::Up) => self.cursor.saturating_sub(1),
            AppEvent::Nav(Direction::Down) => (self.cursor + 1).min(last),
            AppEvent::ScrollUp => self.cursor.saturating_sub(page),
            AppEvent::ScrollDown => (self.cursor + page).min(last),
            _ => return,
        };
        self.keep_cursor_visible(page);
        tracing::debug!(cursor = self.cursor, scroll = self.scroll, "detail: cursor moved");
    }

    fn keep_cursor_visible(&mut self, height: usize) {
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + height {
            self.scroll = self.cursor + 1 - height;
        }
    }
}

pub struct JsonView<'a> {
    state: &'a JsonViewState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> JsonView<'a> {
    pub fn new(state: &'a JsonViewState, focused: bool, theme: &'a Theme) -> Self {
        Self { state, focused, theme }
    }
}

impl Widget for JsonView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border.focused
        } else {
            self.theme.border.unfocused
        };
        let title = match self.state.current() {
            Some(line) if self.focused => format!("Detail {}", line.path),
            _ => "Detail".to_string(),
        };
        let block = Block::bordered().title(title).border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let height = inner.height as usize;
        self.state.last_height.set(height);

        if self.state.lines.is_empty() {
            let msg = if self.state.record.is_some() { "no user payload" } else { "no record selected" };
            Paragraph::new(Line::from(Span::styled(msg, Style::default().add_modifier(Modifier::DIM))))
                .render(inner, buf);
            return;
        }

        // The cursor may have moved without a render in between.
        let mut scroll = self.state.scroll;
        if self.state.cursor >= scroll + height {
            scroll = self.state.cursor + 1 - height.max(1);
        }

        let lines: Vec<Line<'_>> = self
            .state
            .lines
            .iter()
            .enumerate()
            .skip(scroll)
            .take(height)
            .map(|(i, line)| {
                let spans: Vec<Span<'_>> = line
                    .segments
                    .iter()
                    .map(|seg| {
                        let mut style = self.theme.json_style(seg.role);
                        if seg.action.is_some() && self.focused && i == self.state.cursor {
                            style = style.add_modifier(Modifier::UNDERLINED);
                        }
                        Span::styled(seg.text.as_str(), style)
                    })
                    .collect();
                let rendered = Line::from(spans);
                if i == self.state.cursor {
                    rendered.patch_style(self.theme.json.selected)
                } else {
                    rendered
                }
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emulog_core::FilterValue;
    use serde_json::json;

    fn record() -> LogRecord {
        let mut rec = LogRecord::new("info", "hello", 0);
        rec.data.insert("user".into(), json!({"name": "Ada", "pets": ["cat"]}));
        rec
    }

    #[test]
    fn lands_on_first_clickable_line() {
        let mut state = JsonViewState::default();
        state.show(Some((3, &record())), &mut AccessorCache::new());
        assert_eq!(state.record, Some(3));
        let action = state.primary_action().unwrap();
        assert_eq!(action.path, "user.name");
        assert_eq!(action.value, FilterValue::from("Ada"));
    }

    #[test]
    fn key_action_is_presence() {
        let mut state = JsonViewState::default();
        state.show(Some((0, &record())), &mut AccessorCache::new());
        let action = state.key_action().unwrap();
        assert_eq!(action.path, "user.name");
        assert!(action.value.is_wildcard());
    }

    #[test]
    fn navigation_reaches_array_elements() {
        let mut state = JsonViewState::default();
        state.show(Some((0, &record())), &mut AccessorCache::new());
        state.handle(&AppEvent::Nav(Direction::Down));
        state.handle(&AppEvent::Nav(Direction::Down));
        assert_eq!(state.primary_action().unwrap().path, "user.pets[0]");
        for _ in 0..10 {
            state.handle(&AppEvent::Nav(Direction::Down));
        }
        assert_eq!(state.cursor, state.lines.len() - 1);
    }

    #[test]
    fn record_without_payload_is_empty() {
        let mut state = JsonViewState::default();
        state.show(Some((1, &LogRecord::new("info", "bare", 0))), &mut AccessorCache::new());
        assert!(state.lines.is_empty());
        assert!(state.primary_action().is_none());
        state.show(None, &mut AccessorCache::new());
        assert_eq!(state.record, None);
    }
}
