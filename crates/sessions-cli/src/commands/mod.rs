//! CLI subcommand implementations.

pub mod compute;
pub mod run;

use clap::Args;
use sessions_core::SessionConfig;

use crate::Config;

/// Segmentation overrides shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct SegmentationArgs {
    /// Largest gap in seconds that keeps activities in one session.
    #[arg(long, value_name = "SECS")]
    pub gap_threshold: Option<u32>,

    /// Fail on activities answered before they were first seen.
    #[arg(long)]
    pub strict: bool,
}

impl SegmentationArgs {
    /// Applies command-line overrides on top of the loaded configuration.
    pub fn resolve(&self, config: &Config) -> SessionConfig {
        let mut session = config.session_config();
        if let Some(secs) = self.gap_threshold {
            session.gap_threshold_secs = secs;
        }
        session.strict_timestamps |= self.strict;
        tracing::debug!(?session, "resolved segmentation settings");
        session
    }
}
