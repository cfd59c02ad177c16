use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use emulog::{headless::run_headless, Cli};
use emulog_core::config::Config;
use emulog_feeds::{spawn_file_feed, spawn_stdin_feed};
use tracing_subscriber::EnvFilter;

const DEBUG_LOG: &str = "/tmp/emulog-debug.log";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let config = match &cli.config {
        Some(path) => Config::layered(Some(path.clone()))?,
        None => Config::load()?,
    };

    if let Some(path) = &cli.file {
        if !path.is_file() {
            bail!("no such log file: {}", path.display());
        }
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    let result = runtime.block_on(async {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let feed = match &cli.file {
            Some(path) => spawn_file_feed(path.clone(), cli.follow(config.feed.follow), tx),
            None => spawn_stdin_feed(tx),
        };

        let result = if cli.headless {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            run_headless(rx, &cli.query, &mut out).await.map(|_| ())
        } else {
            let source = cli.source_name();
            let query = cli.query.clone();
            tokio::task::spawn_blocking(move || emulog_tui::run(config, rx, source, &query))
                .await
                .context("TUI thread panicked")?
        };
        feed.abort();
        result
    });

    // Blocking stdin reads never finish on their own once the TUI quits.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(DEBUG_LOG)
            .with_context(|| format!("cannot open {DEBUG_LOG}"))?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("emulog debug log started, tail -f {DEBUG_LOG}");
    } else if cli.headless {
        // stdout carries records, so diagnostics go to stderr.
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .init();
    }
    Ok(())
}
