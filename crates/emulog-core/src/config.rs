//! User configuration.
//!
//! The embedded [`BUILTIN`] TOML is always the bottom layer, so every key has
//! a value before any user file is read. [`Config::load`] overlays
//! `$XDG_CONFIG_HOME/emulog/config.toml` (or `~/.config/…`) and writes the
//! built-in file there on first run so users have something to edit.

use std::path::{Path, PathBuf};

use config::{File, FileFormat};
use serde::Deserialize;

/// Built-in configuration, also the template written on first run.
pub const BUILTIN: &str = r#"# emulog configuration. Delete a key to get its built-in value back.

[ui]
show_timestamps        = true
timestamp_format       = "%H:%M:%S%.3f"   # chrono strftime
detail_pane_height_pct = 40
theme                  = "default"        # default | gruvbox

[feed]
follow = true   # keep reading FILE as it grows

[keybindings]
# "x", "G", "tab", "esc", "f5", "ctrl+l"
query_focus    = "/"
toggle_focus   = "tab"
scroll_to_tail = "G"
filter_key     = "*"
clear_query    = "ctrl+l"
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ui: UiConfig,
    pub feed: FeedConfig,
    pub keybindings: KeybindingsConfig,
}

/// `[ui]`
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub show_timestamps: bool,
    pub timestamp_format: String,
    /// Height of the JSON detail pane as a percentage of the body.
    pub detail_pane_height_pct: u16,
    pub theme: String,
}

/// `[feed]`
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub follow: bool,
}

/// `[keybindings]`: key descriptions resolved by the TUI.
#[derive(Debug, Clone, Deserialize)]
pub struct KeybindingsConfig {
    pub query_focus: String,
    /// Cycle focus between the stream and detail panes.
    pub toggle_focus: String,
    pub scroll_to_tail: String,
    /// In the detail pane, filter on the selected key being present.
    pub filter_key: String,
    pub clear_query: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Config::defaults().keybindings
    }
}

impl Config {
    /// Built-in values overlaid with the user's config file, creating the
    /// file from [`BUILTIN`] if it is missing.
    pub fn load() -> anyhow::Result<Self> {
        let path = user_config_path();
        if !path.exists() {
            write_template(&path)?;
            tracing::info!(path = %path.display(), "wrote default config");
        }
        Self::layered(Some(path))
    }

    /// The built-in values alone.
    pub fn defaults() -> Self {
        Self::layered(None).expect("BUILTIN config deserializes")
    }

    /// Built-in values overlaid with `path`, if given. A missing file is not
    /// an error; a malformed one is.
    pub fn layered(path: Option<PathBuf>) -> anyhow::Result<Self> {
        let builder = config::Config::builder().add_source(File::from_str(BUILTIN, FileFormat::Toml));
        let builder = match path {
            Some(path) => builder.add_source(File::from(path).required(false)),
            None => builder,
        };
        Ok(builder.build()?.try_deserialize()?)
    }
}

fn write_template(path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, BUILTIN)
}

fn user_config_path() -> PathBuf {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default()
            .join(".config"),
    };
    base.join("emulog").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_values() {
        let cfg = Config::defaults();
        assert!(cfg.ui.show_timestamps);
        assert_eq!(cfg.ui.detail_pane_height_pct, 40);
        assert_eq!(cfg.ui.theme, "default");
        assert!(cfg.feed.follow);
        assert_eq!(cfg.keybindings.filter_key, "*");
        assert_eq!(cfg.keybindings.clear_query, "ctrl+l");
    }

    #[test]
    fn user_file_overrides_single_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui]\ntheme = \"gruvbox\"\n[feed]\nfollow = false\n").unwrap();

        let cfg = Config::layered(Some(path)).unwrap();
        assert_eq!(cfg.ui.theme, "gruvbox");
        assert!(!cfg.feed.follow);
        assert!(cfg.ui.show_timestamps);
        assert_eq!(cfg.keybindings.query_focus, "/");
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let cfg = Config::layered(Some(PathBuf::from("/nonexistent/emulog.toml"))).unwrap();
        assert_eq!(cfg.ui.timestamp_format, "%H:%M:%S%.3f");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui]\ndetail_pane_height_pct = \"tall\"\n").unwrap();
        assert!(Config::layered(Some(path)).is_err());
    }

    #[test]
    fn template_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        write_template(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), BUILTIN);
        assert_eq!(Config::layered(Some(path)).unwrap().keybindings.toggle_focus, "tab");
    }
}
