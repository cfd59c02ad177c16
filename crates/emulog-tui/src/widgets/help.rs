//! `?` popup listing the bindings in effect, configured ones included.

use crate::theme::Theme;
use emulog_core::config::KeybindingsConfig;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget},
};

pub struct HelpPopup<'a> {
    theme: &'a Theme,
    keys: &'a KeybindingsConfig,
}

impl<'a> HelpPopup<'a> {
    pub fn new(theme: &'a Theme, keys: &'a KeybindingsConfig) -> Self {
        Self { theme, keys }
    }

    fn bindings(&self) -> Vec<(String, &'static str)> {
        let k = self.keys;
        vec![
            ("q  /  Ctrl+c".into(), "Quit"),
            (k.toggle_focus.clone(), "Switch focus: stream ↔ detail"),
            (k.query_focus.clone(), "Focus query bar"),
            ("Escape".into(), "Leave query bar"),
            ("Shift+Enter".into(), "Line break in query"),
            (k.clear_query.clone(), "Clear query"),
            ("↑ k  /  ↓ j".into(), "Move record / line cursor"),
            ("PageUp  /  Ctrl+u".into(), "Scroll up a page"),
            ("PageDown / Ctrl+d".into(), "Scroll down a page"),
            (k.scroll_to_tail.clone(), "Jump to log tail and resume"),
            ("Enter (detail)".into(), "Filter on selected value"),
            (format!("{} (detail)", k.filter_key), "Filter on selected key being set"),
            (":".into(), "Command line (q, help, theme, ts, tail, clear, query)"),
            ("?".into(), "Toggle this help popup"),
        ]
    }
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bindings = self.bindings();
        let popup = centered_rect(84, bindings.len() as u16 + 2, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(" emulog keybindings (? to close) ")
            .border_style(self.theme.border.focused);

        let inner = block.inner(popup);
        block.render(popup, buf);

        let lines: Vec<Line> = bindings
            .into_iter()
            .map(|(key, desc)| {
                Line::from(vec![
                    Span::styled(format!("  {key:<22}"), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(desc),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center).areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center).areas(row);
    popup
}
