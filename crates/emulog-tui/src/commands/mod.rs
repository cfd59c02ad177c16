//! `:` commands: parsing and execution against [`AppState`].

use crate::{app::AppState, event::AppEvent, theme::Theme, theme::THEME_NAMES};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Toggle the help popup.
    Help,
    Theme(String),
    /// Toggle timestamps in the log stream.
    Timestamps,
    /// Jump to the end of the log stream and resume live-tail.
    Tail,
    /// Empty the query.
    Clear,
    /// Replace the query text.
    Query(String),
}

impl Command {
    /// Parse the text after `:`. Blank input is `Ok(None)`; the error is a
    /// message for the command bar.
    pub fn parse(input: &str) -> Result<Option<Command>, String> {
        let mut words = input.trim().splitn(2, char::is_whitespace);
        let Some(word) = words.next().filter(|w| !w.is_empty()) else {
            return Ok(None);
        };
        let rest = words.next().unwrap_or("").trim();

        let cmd = match word {
            "q" | "quit" | "q!" => Command::Quit,
            "help" => Command::Help,
            "ts" | "timestamps" => Command::Timestamps,
            "tail" => Command::Tail,
            "clear" => Command::Clear,
            "query" => Command::Query(rest.to_string()),
            "theme" if rest.is_empty() => {
                return Err(format!("usage: theme <{}>", THEME_NAMES.join("|")))
            }
            "theme" => Command::Theme(rest.to_string()),
            other => return Err(format!("not a command: {other}")),
        };
        Ok(Some(cmd))
    }
}

pub fn execute_command(s: &mut AppState, cmd: Command) {
    match cmd {
        Command::Quit => s.quit = true,
        Command::Help => s.show_help = !s.show_help,
        Command::Theme(name) => s.theme = Theme::by_name(&name),
        Command::Timestamps => s.stream.show_timestamps = !s.stream.show_timestamps,
        Command::Tail => s.stream.handle(&AppEvent::ScrollToTail),
        Command::Clear => s.set_query(""),
        Command::Query(text) => s.set_query(&text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(input: &str) -> Command {
        Command::parse(input).unwrap().unwrap()
    }

    #[test]
    fn aliases_and_surrounding_space() {
        assert_eq!(ok("  quit "), Command::Quit);
        assert_eq!(ok("q!"), Command::Quit);
        assert_eq!(ok("ts"), Command::Timestamps);
    }

    #[test]
    fn theme_requires_a_name() {
        assert_eq!(ok("theme gruvbox"), Command::Theme("gruvbox".to_string()));
        assert!(Command::parse("theme").unwrap_err().contains("default|gruvbox"));
    }

    #[test]
    fn query_keeps_inner_spacing() {
        assert_eq!(ok("query whats  level=info"), Command::Query("whats  level=info".to_string()));
        assert_eq!(ok("query"), Command::Query(String::new()));
    }

    #[test]
    fn blank_is_no_command() {
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(Command::parse(" \t "), Ok(None));
    }

    #[test]
    fn unknown_word_is_reported() {
        assert_eq!(Command::parse("frobnicate"), Err("not a command: frobnicate".to_string()));
    }
}
