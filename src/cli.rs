use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "emulog",
    version,
    about = "Explore Firebase emulator logs with click-to-filter queries"
)]
pub struct Cli {
    /// NDJSON log file to read. Reads stdin when omitted.
    pub file: Option<PathBuf>,

    /// Initial query, e.g. `level=error metadata.emulator.name=functions`.
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Print matching records as NDJSON instead of starting the TUI.
    #[arg(long)]
    pub headless: bool,

    /// Read FILE once instead of following it as it grows.
    #[arg(long)]
    pub no_follow: bool,

    /// Config file to use instead of ~/.config/emulog/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write debug logs to /tmp/emulog-debug.log (tail -f to inspect).
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Whether a file feed should keep reading after EOF. Headless runs
    /// always stop at the end of input.
    pub fn follow(&self, configured: bool) -> bool {
        configured && !self.no_follow && !self.headless
    }

    /// Label for the status line.
    pub fn source_name(&self) -> String {
        match &self.file {
            Some(path) => path.display().to_string(),
            None => "stdin".to_string(),
        }
    }
}
