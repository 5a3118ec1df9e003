use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sessions_cli::commands::{compute, run};
use sessions_cli::{Cli, Commands, Config, ErrorCategory};

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Run(args)) => {
            let config = load_config(cli.config.as_deref())?;
            run::run(&mut io::stdout().lock(), args, &config)?;
        }
        Some(Commands::Compute(args)) => {
            let config = load_config(cli.config.as_deref())?;
            compute::run(&mut io::stdout().lock(), args, &config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so stdout only carries command output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let category = ErrorCategory::classify(&err);
            eprintln!("{category}: {err:#}");
            ExitCode::from(category.exit_code())
        }
    }
}
