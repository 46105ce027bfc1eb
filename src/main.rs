use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use midieditor_rs::cli::{Cli, run};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    info!("MIDI Editor {}", env!("CARGO_PKG_VERSION"));

    let stdout = io::stdout();
    run(&cli, &mut stdout.lock())
        .with_context(|| format!("editing {}", cli.input.display()))?;
    Ok(())
}
