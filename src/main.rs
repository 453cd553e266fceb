// ABOUTME: Entry point for the polepole CLI application.
// ABOUTME: Parses arguments and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use polepole::config::{self, Config};
use polepole::error::Result;
use polepole::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let output = Output::new(mode);

    if let Err(e) = run(cli, output).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: Output) -> Result<()> {
    match cli.command {
        Commands::Init { app, image, force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, app.as_deref(), image.as_deref(), force)
        }
        Commands::Deploy { destination, force } => {
            let config = load_config(destination.as_deref())?;
            commands::deploy(config, force, output).await
        }
        Commands::Promote {
            revision,
            weight,
            destination,
        } => {
            let config = load_config(destination.as_deref())?;
            commands::promote(config, &revision, weight, output).await
        }
        Commands::Status { destination } => {
            let config = load_config(destination.as_deref())?;
            commands::status(config, output).await
        }
        Commands::Logs { tail, destination } => {
            let config = load_config(destination.as_deref())?;
            commands::logs(config, tail, output).await
        }
        Commands::Revisions { destination } => {
            let config = load_config(destination.as_deref())?;
            commands::revisions(config, output).await
        }
        Commands::Stop { destination } => {
            let config = load_config(destination.as_deref())?;
            commands::stop(config, output).await
        }
        Commands::Cleanup { destination } => {
            let config = load_config(destination.as_deref())?;
            commands::cleanup(config, output).await
        }
    }
}

/// Discover the config file and apply destination overrides.
fn load_config(destination: Option<&str>) -> Result<Config> {
    let cwd = env::current_dir()?;
    let config = Config::discover(&cwd)?;
    match destination {
        Some(dest) => config.for_destination(dest),
        None => Ok(config),
    }
}
