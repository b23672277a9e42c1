mod cli;
mod commands;
mod output;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use commands::CommandOptions;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive
const LOG_ENV: &str = "OBJSYNC_LOG";

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\n\nInterrupted by user (Ctrl+C)");
        std::process::exit(130);
    })
    .context("Failed to set Ctrl+C handler")?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = CommandOptions {
        dry_run: cli.dry_run,
        json: cli.json,
        quiet: cli.quiet,
        config_path: cli.config.as_deref(),
        no_config: cli.no_config,
    };

    match &cli.command {
        Commands::Cp { args } => {
            commands::Cp::execute(args, &options).context("Failed to execute cp command")?;
        }
        Commands::Mirror {
            source,
            targets,
            force,
        } => {
            commands::Mirror::execute(source, targets, *force, &options)
                .context("Failed to execute mirror command")?;
        }
        Commands::Cat { sources } => {
            commands::Cat::execute(sources).context("Failed to execute cat command")?;
        }
        Commands::Config => {
            commands::Config::execute(&options).context("Failed to execute config command")?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
