use anyhow::Result;
use clap::Parser;
use std::io;
use tracing_subscriber::EnvFilter;

use capital_gains::cli::runner::{run, OutputMode};
use capital_gains::cli::Cli;
use capital_gains::config::Settings;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only results
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let settings = cli.apply_overrides(Settings::load(cli.config.as_deref())?);
    tracing::debug!(
        "Settings: sell_accounting={}, strict={}",
        settings.sell_accounting.as_str(),
        settings.strict
    );

    let mode = if cli.explain {
        OutputMode::Explain
    } else {
        OutputMode::Json
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();
    run(
        stdin.lock(),
        &mut stdout.lock(),
        &mut stderr.lock(),
        &settings,
        mode,
    )?;

    Ok(())
}
