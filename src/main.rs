//! Autodent - a terminal scratch editor with automatic indent follow.
//!
//! # Usage
//!
//! ```bash
//! autodent notes.txt
//! autodent --show-whitespace notes.txt
//! autodent --log-file /tmp/autodent.log notes.txt
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;

use autodent::app::App;

/// A terminal scratch editor that follows indentation as the cursor moves
#[derive(Parser, Debug)]
#[command(name = "autodent", version, about, long_about = None)]
struct Cli {
    /// File to edit (opens an empty scratch buffer when omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Render whitespace as visible markers from the start
    #[arg(long)]
    show_whitespace: bool,

    /// Write tracing output to a file (stderr belongs to the TUI)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("autodent=debug".parse()?),
            )
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive(tracing::Level::WARN.into()),
            )
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let mut app = App::new(cli.file).with_show_whitespace(cli.show_whitespace);
    app.run().context("Application error")
}
