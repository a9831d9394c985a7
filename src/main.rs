mod app;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use app::{Cli, load_config, run};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let outcome = run(&cli.command, &config)?;

    for line in &outcome.lines {
        println!("{line}");
    }

    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
