//! # Card Search worker (`cardsearch`)
//!
//! Runs one search worker session over stdio. Each stdin line is one inbound
//! message; each outbound message is written to stdout as one JSON line.
//! Logs go to stderr (filter with `RUST_LOG`).
//!
//! Closing stdin ends the session once any pending build has reported, so
//! a piped batch gets every reply:
//!
//! ```bash
//! printf '%s\n' \
//!   '{"type":"BUILD","payload":{"files":["cards/base1.json"]}}' \
//!   '{"type":"SEARCH","payload":{"query":"charzard"}}' | cardsearch
//! ```
//!
//! The `SEARCH` above is answered before the build finishes, so it sees
//! `NOT_READY`; an interactive host waits for `READY` first.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use card_search::config::{load_config, Config};
use card_search::fetch::DefaultFetcher;
use card_search::protocol::Command;
use card_search::worker::spawn_worker;

/// Card Search: a message-driven card index and fuzzy search worker.
#[derive(Parser)]
#[command(name = "cardsearch", version)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    let fetcher = Arc::new(DefaultFetcher::new(&config.loader)?);
    let (commands, mut events, session) = spawn_worker(&config, fetcher).into_parts();

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(event) = events.recv().await {
            let mut line = serde_json::to_string(&event)?;
            line.push('\n');
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
        }
        anyhow::Ok(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        commands
            .send(Command::decode(&line))
            .map_err(|_| anyhow!("search worker has shut down"))?;
    }

    drop(commands);
    session.await?;
    writer.await??;
    Ok(())
}
