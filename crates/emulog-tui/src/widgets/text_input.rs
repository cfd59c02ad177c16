//! Editable text with a byte-offset cursor, shared by the query bar and the
//! command bar. The cursor always sits on a char boundary.

use crate::event::{AppEvent, Direction};

/// What an event did to a [`TextInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// The text changed.
    Changed,
    /// Only the cursor moved.
    Moved,
    Ignored,
}

#[derive(Debug, Default, Clone)]
pub struct TextInput {
    pub text: String,
    /// Byte offset into `text`.
    pub cursor: usize,
}

impl TextInput {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Replace the text and put the cursor at the end.
    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.set("");
    }

    /// Characters before the cursor, i.e. its display column.
    pub fn column(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }

    pub fn apply(&mut self, event: &AppEvent) -> Edit {
        match event {
            AppEvent::Char(c) => {
                self.text.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Edit::Changed
            }
            AppEvent::Backspace if self.cursor > 0 => {
                self.cursor = self.prev();
                self.text.remove(self.cursor);
                Edit::Changed
            }
            AppEvent::Nav(Direction::Left) if self.cursor > 0 => {
                self.cursor = self.prev();
                Edit::Moved
            }
            AppEvent::Nav(Direction::Right) if self.cursor < self.text.len() => {
                self.cursor = self.next();
                Edit::Moved
            }
            _ => Edit::Ignored,
        }
    }

    fn prev(&self) -> usize {
        self.text[..self.cursor].char_indices().next_back().map_or(0, |(i, _)| i)
    }

    fn next(&self) -> usize {
        self.text[self.cursor..]
            .chars()
            .next()
            .map_or(self.text.len(), |c| self.cursor + c.len_utf8())
    }
}
