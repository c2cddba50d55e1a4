//! pipeshift - translate CI/CD pipeline definitions between systems

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod commands;
mod config;
mod errors;
mod tracing;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::tracing::TracingConfig;
use clap::Parser;
use std::io::Write;

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = Cli::parse();

    let tracing_config = TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
        ..Default::default()
    };
    if let Err(error) = crate::tracing::init_tracing(tracing_config) {
        eprintln!("{error:?}");
        std::process::exit(1);
    }

    if let Err(error) = run(cli) {
        eprintln!("{error:?}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> miette::Result<()> {
    let output = match cli.command {
        Commands::Classify { ref file, strict, json } => {
            let text = commands::read_input(file.as_deref())?;
            let policy = if strict {
                pipeshift_core::ClassifyPolicy::Strict
            } else {
                load_config(&cli)?.classify.policy
            };
            commands::classify(&text, policy, json)?
        }
        Commands::Parse {
            ref file,
            ref from,
            format,
            check,
        } => {
            let text = commands::read_input(file.as_deref())?;
            commands::parse(&text, from, format, check)?
        }
        Commands::Translate {
            ref file,
            ref from,
            ref to,
        } => {
            let config = load_config(&cli)?;
            let text = commands::read_input(file.as_deref())?;
            commands::translate_text(&text, from.as_deref(), to, &config)?
        }
        Commands::Formats { json } => commands::formats(json)?,
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| miette::miette!("Failed to write output: {e}"))?;
    Ok(())
}

fn load_config(cli: &Cli) -> errors::Result<Config> {
    let cwd = std::env::current_dir().map_err(|e| errors::CliError::file("resolve", ".", e))?;
    Config::load(cli.config.as_deref(), &cwd)
}
