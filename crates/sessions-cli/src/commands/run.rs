//! Run command: fetch activities, compute sessions, submit them.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use sessions_core::SessionsPayload;

use crate::Config;
use crate::commands::SegmentationArgs;
use crate::pipeline::{ActivitySource, ApiGateway, FileSource, SessionSink, WriterSink, run_pipeline};
use crate::render::{OutputFormat, plural};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Read activities from a JSON file (`-` for stdin) instead of the API.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Print the sessions payload instead of submitting it.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub segmentation: SegmentationArgs,
}

pub fn run<W: Write>(writer: &mut W, args: &RunArgs, config: &Config) -> Result<SessionsPayload> {
    let session_config = args.segmentation.resolve(config);

    // Only connect when the API is actually one of the ends.
    let gateway = if args.input.is_none() || !args.dry_run {
        Some(ApiGateway::from_config(config)?)
    } else {
        None
    };
    let file_source = args.input.clone().map(|path| FileSource::new(Some(path)));

    let source: &dyn ActivitySource = match (&file_source, &gateway) {
        (Some(file), _) => file,
        (None, Some(gateway)) => gateway,
        (None, None) => bail!("no activity source configured"),
    };

    let mut stdout_sink;
    let mut api_sink;
    let sink: &mut dyn SessionSink = match (args.dry_run, &gateway) {
        (true, _) => {
            stdout_sink = WriterSink::new(writer, OutputFormat::Json, true);
            &mut stdout_sink
        }
        (false, Some(gateway)) => {
            api_sink = gateway;
            &mut api_sink
        }
        (false, None) => bail!("no session sink configured"),
    };

    let payload = run_pipeline(source, &session_config, sink)?;
    if !args.dry_run {
        eprintln!(
            "Submitted {} for {}",
            plural(payload.session_count(), "session"),
            plural(payload.user_sessions.len(), "user")
        );
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_from_file_needs_no_api_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activities.json");
        std::fs::write(
            &path,
            r#"{"activities":[{"id":1,"user_id":"u1","first_seen_at":"2023-01-01T00:00:00Z","answered_at":"2023-01-01T00:00:10Z"}]}"#,
        )
        .unwrap();

        let args = RunArgs {
            input: Some(path),
            dry_run: true,
            segmentation: SegmentationArgs::default(),
        };
        let mut output = Vec::new();
        let payload = run(&mut output, &args, &Config::default()).unwrap();

        assert_eq!(payload.session_count(), 1);
        let printed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(printed["user_sessions"]["u1"][0]["activity_ids"][0], 1);
    }

    #[test]
    fn test_submitting_requires_api_config() {
        let args = RunArgs {
            input: Some(PathBuf::from("activities.json")),
            dry_run: false,
            segmentation: SegmentationArgs::default(),
        };
        let mut output = Vec::new();
        let err = run(&mut output, &args, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("missing API URL"));
        assert!(output.is_empty());
    }
}
