//! Colour themes.
//!
//! A theme is a TOML document embedded with [`include_str!`]; see
//! `themes/default.toml` for the full set of tables. Each table
//! deserializes into a section struct over [`StyleSpec`] and is then resolved
//! once into ratatui [`Style`]s, so drawing never touches the raw strings.
//!
//! Emulator names are hashed into the `[emulators] palette` so `functions`
//! and `firestore` keep their colours for the whole session.

use std::str::FromStr;

use config::{Config, File, FileFormat};
use emulog_core::hierarchy::SegmentRole;
use emulog_core::LogLevel;
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

const DEFAULT_THEME: &str = include_str!("themes/default.toml");
const GRUVBOX_THEME: &str = include_str!("themes/gruvbox_dark.toml");

/// Names accepted by [`Theme::by_name`].
pub const THEME_NAMES: &[&str] = &["default", "gruvbox"];

/// One style as written in a theme file:
/// `{ fg = "light_blue", bg = "236", modifiers = ["bold"] }`.
///
/// Colours use ratatui's names (`dark_gray`, `lightred`), `#rrggbb`, or a
/// 256-colour index. Unknown colours and modifiers are ignored with a warning.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleSpec {
    fg: Option<String>,
    bg: Option<String>,
    #[serde(default)]
    modifiers: Vec<String>,
}

impl StyleSpec {
    fn resolve(&self) -> Style {
        let mut style = Style::default();
        if let Some(fg) = self.fg.as_deref().and_then(color) {
            style = style.fg(fg);
        }
        if let Some(bg) = self.bg.as_deref().and_then(color) {
            style = style.bg(bg);
        }
        self.modifiers
            .iter()
            .filter_map(|name| modifier(name))
            .fold(style, Style::add_modifier)
    }
}

fn color(name: &str) -> Option<Color> {
    let parsed = Color::from_str(name).ok();
    if parsed.is_none() {
        tracing::warn!(color = name, "unknown theme colour");
    }
    parsed
}

fn modifier(name: &str) -> Option<Modifier> {
    let m = match name.to_ascii_lowercase().as_str() {
        "bold" => Modifier::BOLD,
        "dim" => Modifier::DIM,
        "italic" => Modifier::ITALIC,
        "underlined" | "underline" => Modifier::UNDERLINED,
        "reversed" => Modifier::REVERSED,
        other => {
            tracing::warn!(modifier = other, "unknown theme modifier");
            return None;
        }
    };
    Some(m)
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// `[levels]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Levels<S> {
    pub trace: S,
    pub debug: S,
    pub info: S,
    pub user: S,
    pub system: S,
    pub warn: S,
    pub error: S,
    pub fatal: S,
}

/// `[borders]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Borders<S> {
    pub focused: S,
    pub unfocused: S,
    pub command_bar: S,
}

/// `[search]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Search<S> {
    /// Matched spans in the log stream.
    pub highlight: S,
}

/// `[query]`: query bar tokens.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryStyles<S> {
    pub text: S,
    pub key: S,
    pub value: S,
    /// Pairs whose key is not accepted.
    pub invalid: S,
}

/// `[json]`: detail pane segments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonStyles<S> {
    pub key: S,
    pub string: S,
    pub number: S,
    pub keyword: S,
    pub punct: S,
    /// Patched onto the line under the cursor.
    pub selected: S,
}

#[derive(Debug, Deserialize)]
struct ThemeFile {
    levels: Levels<StyleSpec>,
    borders: Borders<StyleSpec>,
    search: Search<StyleSpec>,
    query: QueryStyles<StyleSpec>,
    json: JsonStyles<StyleSpec>,
    emulators: EmulatorPalette,
}

#[derive(Debug, Deserialize)]
struct EmulatorPalette {
    palette: Vec<String>,
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Theme {
    pub levels: Levels<Style>,
    pub border: Borders<Style>,
    pub search: Search<Style>,
    pub query: QueryStyles<Style>,
    pub json: JsonStyles<Style>,
    emulator_palette: Vec<Color>,
}

impl Theme {
    /// Resolve a theme name, falling back to the default for unknown names.
    pub fn by_name(name: &str) -> Self {
        let src = match name.to_ascii_lowercase().replace('-', "_").as_str() {
            "gruvbox" | "gruvbox_dark" => GRUVBOX_THEME,
            "default" => DEFAULT_THEME,
            other => {
                tracing::warn!(theme = other, known = ?THEME_NAMES, "unknown theme, using default");
                DEFAULT_THEME
            }
        };
        Self::embedded(src)
    }

    pub fn load_default() -> Self {
        Self::embedded(DEFAULT_THEME)
    }

    /// Embedded themes are covered by tests, so a parse failure here is a
    /// build defect.
    fn embedded(src: &str) -> Self {
        Self::from_toml_str(src).expect("embedded theme is valid")
    }

    /// Parse a theme document. Extra keys are ignored.
    pub fn from_toml_str(src: &str) -> anyhow::Result<Self> {
        let file: ThemeFile = Config::builder()
            .add_source(File::from_str(src, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        let l = &file.levels;
        let b = &file.borders;
        let q = &file.query;
        let j = &file.json;

        Ok(Self {
            levels: Levels {
                trace: l.trace.resolve(),
                debug: l.debug.resolve(),
                info: l.info.resolve(),
                user: l.user.resolve(),
                system: l.system.resolve(),
                warn: l.warn.resolve(),
                error: l.error.resolve(),
                fatal: l.fatal.resolve(),
            },
            border: Borders {
                focused: b.focused.resolve(),
                unfocused: b.unfocused.resolve(),
                command_bar: b.command_bar.resolve(),
            },
            search: Search { highlight: file.search.highlight.resolve() },
            query: QueryStyles {
                text: q.text.resolve(),
                key: q.key.resolve(),
                value: q.value.resolve(),
                invalid: q.invalid.resolve(),
            },
            json: JsonStyles {
                key: j.key.resolve(),
                string: j.string.resolve(),
                number: j.number.resolve(),
                keyword: j.keyword.resolve(),
                punct: j.punct.resolve(),
                selected: j.selected.resolve(),
            },
            emulator_palette: file.emulators.palette.iter().filter_map(|c| color(c)).collect(),
        })
    }

    /// Style for a record's level; unrecognised levels are unstyled.
    pub fn level_style(&self, level: Option<LogLevel>) -> Style {
        let Some(level) = level else {
            return Style::default();
        };
        let l = &self.levels;
        match level {
            LogLevel::Trace => l.trace,
            LogLevel::Debug => l.debug,
            LogLevel::Info => l.info,
            LogLevel::User => l.user,
            LogLevel::System => l.system,
            LogLevel::Warn => l.warn,
            LogLevel::Error => l.error,
            LogLevel::Fatal => l.fatal,
        }
    }

    pub fn emulator_style(&self, emulator: &str) -> Style {
        match self.emulator_palette.len() {
            0 => Style::default(),
            n => Style::default().fg(self.emulator_palette[fnv1a(emulator) % n]),
        }
    }

    pub fn json_style(&self, role: SegmentRole) -> Style {
        let j = &self.json;
        match role {
            SegmentRole::Plain => Style::default(),
            SegmentRole::Key => j.key,
            SegmentRole::String => j.string,
            SegmentRole::Number => j.number,
            SegmentRole::Keyword => j.keyword,
            SegmentRole::Punct => j.punct,
        }
    }
}

/// FNV-1a; unlike `DefaultHasher` it is fixed across releases.
fn fnv1a(s: &str) -> usize {
    let hash = s
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |h, b| (h ^ u64::from(b)).wrapping_mul(0x100_0000_01b3));
    hash as usize
}
