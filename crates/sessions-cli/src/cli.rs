//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{compute::ComputeArgs, run::RunArgs};

/// Activity session builder.
///
/// Groups each user's activities into sessions separated by idle gaps,
/// then submits them or prints them.
#[derive(Debug, Parser)]
#[command(name = "sessions", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch activities, compute sessions, and submit them.
    Run(RunArgs),

    /// Compute sessions from a local activities file and print them.
    Compute(ComputeArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::parse_from([
            "sessions",
            "--verbose",
            "run",
            "--dry-run",
            "--gap-threshold",
            "120",
            "--strict",
        ]);
        assert!(cli.verbose);
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run command");
        };
        assert!(args.dry_run);
        assert_eq!(args.segmentation.gap_threshold, Some(120));
        assert!(args.segmentation.strict);
    }

    #[test]
    fn test_parse_compute_defaults_to_stdin() {
        let cli = Cli::parse_from(["sessions", "compute"]);
        let Some(Commands::Compute(args)) = cli.command else {
            panic!("expected compute command");
        };
        assert!(args.input.is_none());
        assert!(!args.pretty);
    }
}
