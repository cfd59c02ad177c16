//! Semantic application events: crossterm key events mapped to a
//! widget-agnostic vocabulary so widgets never touch crossterm directly.
//!
//! # Usage
//!
//! Build a [`Keymap`] from the `[keybindings]` config section once at
//! startup, then call [`Keymap::to_app_event`] on every
//! [`crossterm::event::Event`] (or [`Keymap::to_app_event_insert`] while a
//! text input has focus).
//!
//! # Keybindings
//!
//! Five bindings come from config (defaults in brackets): query focus [`/`],
//! focus toggle [`Tab`], scroll to tail [`G`], filter on key [`*`], clear
//! query [`Ctrl+l`]. The rest are fixed: `q`/`Ctrl+c` quit, arrows or `hjkl`
//! navigate, `PageUp`/`PageDown` (`Ctrl+u`/`Ctrl+d`) scroll.
//!
//! While a text input has focus every printable key is a `Char`, and of the
//! configured bindings only those using `Ctrl` (plus `Tab`) still fire.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use emulog_core::config::KeybindingsConfig;

/// Cardinal direction for list, tree and cursor navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A semantic application event derived from a raw crossterm [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Quit,
    /// Move focus between the log stream and the detail pane.
    FocusNext,
    /// Transfer focus to the query bar.
    QueryFocus,
    ScrollUp,
    ScrollDown,
    /// Jump to the tail (newest record) of the log stream.
    ScrollToTail,
    /// Filter on the selected detail line's key being present.
    FilterKey,
    /// Empty the query.
    ClearQuery,
    Nav(Direction),
    /// A printable character forwarded to the active text input.
    Char(char),
    Backspace,
    Enter,
    Resize(u16, u16),
    /// Dismiss the active modal (query bar focus, help popup, command bar).
    Escape,
}

/// One key chord, e.g. `ctrl+l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Parse `"/"`, `"G"`, `"tab"`, `"ctrl+l"`, `"f5"`, … Returns `None` for
    /// descriptions that name no key.
    pub fn parse(desc: &str) -> Option<Self> {
        let desc = desc.trim();
        let (modifiers, key) = match desc.rsplit_once('+') {
            Some((mods, key)) if !key.is_empty() => (parse_modifiers(mods)?, key),
            _ => (KeyModifiers::NONE, desc),
        };
        let code = match key.to_ascii_lowercase().as_str() {
            "tab" => KeyCode::Tab,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "space" => KeyCode::Char(' '),
            "backspace" => KeyCode::Backspace,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            f if f.len() > 1 && f.starts_with('f') => KeyCode::F(f[1..].parse().ok()?),
            _ => {
                let mut chars = key.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeyCode::Char(c)
            }
        };
        Some(Self { code, modifiers })
    }

    /// Whether `key` is this chord. Shift is ignored for characters since
    /// terminals disagree on reporting it alongside an uppercase letter.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        if key.code != self.code {
            return false;
        }
        match self.code {
            KeyCode::Char(_) => {
                key.modifiers.difference(KeyModifiers::SHIFT)
                    == self.modifiers.difference(KeyModifiers::SHIFT)
            }
            _ => key.modifiers == self.modifiers,
        }
    }

    fn uses_control(&self) -> bool {
        self.modifiers.contains(KeyModifiers::CONTROL) || self.code == KeyCode::Tab
    }
}

fn parse_modifiers(desc: &str) -> Option<KeyModifiers> {
    desc.split('+').try_fold(KeyModifiers::NONE, |acc, m| {
        let m = match m.trim().to_ascii_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "alt" => KeyModifiers::ALT,
            "shift" => KeyModifiers::SHIFT,
            _ => return None,
        };
        Some(acc | m)
    })
}

/// The resolved `[keybindings]` section.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<(KeyBinding, AppEvent)>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeybindingsConfig::default())
    }
}

impl Keymap {
    /// Resolve configured key descriptions; unparseable ones fall back to
    /// their defaults with a warning.
    pub fn from_config(cfg: &KeybindingsConfig) -> Self {
        let defaults = KeybindingsConfig::default();
        let entries = [
            ("query_focus", &cfg.query_focus, &defaults.query_focus, AppEvent::QueryFocus),
            ("toggle_focus", &cfg.toggle_focus, &defaults.toggle_focus, AppEvent::FocusNext),
            ("scroll_to_tail", &cfg.scroll_to_tail, &defaults.scroll_to_tail, AppEvent::ScrollToTail),
            ("filter_key", &cfg.filter_key, &defaults.filter_key, AppEvent::FilterKey),
            ("clear_query", &cfg.clear_query, &defaults.clear_query, AppEvent::ClearQuery),
        ];
        let bindings = entries
            .into_iter()
            .filter_map(|(name, desc, fallback, event)| {
                let binding = KeyBinding::parse(desc).or_else(|| {
                    tracing::warn!(binding = name, value = %desc, "unrecognised key, using default");
                    KeyBinding::parse(fallback)
                })?;
                Some((binding, event))
            })
            .collect();
        Self { bindings }
    }

    /// Map a raw crossterm [`Event`] in normal / navigation mode.
    ///
    /// Returns `None` for events with no meaning to the application (mouse
    /// events, unbound keys).
    pub fn to_app_event(&self, event: Event) -> Option<AppEvent> {
        match event {
            Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            Event::Key(key) => self.lookup(&key, false).or_else(|| fixed_binding(key, false)),
            _ => None,
        }
    }

    /// Map a raw crossterm [`Event`] while a text input has focus.
    pub fn to_app_event_insert(&self, event: Event) -> Option<AppEvent> {
        match event {
            Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            Event::Key(key) => self.lookup(&key, true).or_else(|| fixed_binding(key, true)),
            _ => None,
        }
    }

    fn lookup(&self, key: &KeyEvent, insert: bool) -> Option<AppEvent> {
        self.bindings
            .iter()
            .filter(|(binding, _)| !insert || binding.uses_control())
            .find(|(binding, _)| binding.matches(key))
            .map(|(_, event)| event.clone())
    }
}

/// Keys that are not configurable. In insert mode letters are text, so only
/// arrows, editing keys and `Ctrl+c` keep a meaning; `Shift+Enter` becomes a
/// line break.
fn fixed_binding(key: KeyEvent, insert: bool) -> Option<AppEvent> {
    use KeyCode::*;

    let plain = key.modifiers == KeyModifiers::NONE;
    let ctrl = key.modifiers == KeyModifiers::CONTROL;
    let nav = |d| Some(AppEvent::Nav(d));

    let event = match key.code {
        Char('c') if ctrl => AppEvent::Quit,
        Esc => AppEvent::Escape,
        Backspace if plain => AppEvent::Backspace,
        Enter if plain => AppEvent::Enter,
        Enter if insert && key.modifiers == KeyModifiers::SHIFT => AppEvent::Char('\n'),
        Up => return nav(Direction::Up),
        Down => return nav(Direction::Down),
        Left => return nav(Direction::Left),
        Right => return nav(Direction::Right),
        _ if insert => return typed_char(key),
        Char('q') if plain => AppEvent::Quit,
        Char('k') if plain => return nav(Direction::Up),
        Char('j') if plain => return nav(Direction::Down),
        Char('h') if plain => return nav(Direction::Left),
        Char('l') if plain => return nav(Direction::Right),
        PageUp => AppEvent::ScrollUp,
        PageDown => AppEvent::ScrollDown,
        Char('u') if ctrl => AppEvent::ScrollUp,
        Char('d') if ctrl => AppEvent::ScrollDown,
        _ => return typed_char(key),
    };
    Some(event)
}

fn typed_char(key: KeyEvent) -> Option<AppEvent> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => {
            Some(AppEvent::Char(c))
        }
        _ => None,
    }
}
