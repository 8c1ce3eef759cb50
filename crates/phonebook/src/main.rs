//! Phonebook - keyboard-driven contacts manager over a local SQLite file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use phonebook_common::ContactStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "phonebook")]
#[command(about = "Personal contacts manager with a terminal UI", long_about = None)]
#[command(version)]
struct Cli {
    /// Path of the SQLite contacts file
    #[arg(long, default_value = "contacts.db")]
    db: PathBuf,

    /// Discard unsaved changes on exit instead of committing them;
    /// [S] still saves explicitly
    #[arg(long)]
    no_auto_save: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so the alternate screen stays clean; enable with
    // RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = ContactStore::open(&cli.db, !cli.no_auto_save)
        .with_context(|| format!("failed to open contacts database {}", cli.db.display()))?;

    phonebook::tui::run(store)
}
