//! Compute command: offline session computation from a local file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use sessions_core::SessionsPayload;

use crate::Config;
use crate::commands::SegmentationArgs;
use crate::pipeline::{FileSource, WriterSink, run_pipeline};
use crate::render::OutputFormat;

#[derive(Debug, Args)]
pub struct ComputeArgs {
    /// Activities JSON file; reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub segmentation: SegmentationArgs,
}

pub fn run<W: Write>(writer: &mut W, args: &ComputeArgs, config: &Config) -> Result<SessionsPayload> {
    let session_config = args.segmentation.resolve(config);
    let source = FileSource::new(args.input.clone());
    let mut sink = WriterSink::new(writer, args.format, args.pretty);
    run_pipeline(&source, &session_config, &mut sink)
}
