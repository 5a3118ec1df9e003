//! The fetch, compute, submit pipeline and its collaborators.
//!
//! The session computation itself is pure; everything that touches the
//! network, files, or the terminal sits behind [`ActivitySource`] and
//! [`SessionSink`].

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use sessions_api::Client;
use sessions_core::{RawActivity, SessionConfig, SessionsPayload, compute_sessions};
use tokio::runtime::Runtime;

use crate::Config;
use crate::render::{OutputFormat, render};

/// Supplies the raw activity list for one run.
pub trait ActivitySource {
    fn fetch(&self) -> Result<Vec<RawActivity>>;
}

/// Receives the computed sessions.
pub trait SessionSink {
    fn submit(&mut self, payload: &SessionsPayload) -> Result<()>;
}

/// Fetches activities, computes sessions, then hands them to the sink.
///
/// The sink is only reached when every earlier stage succeeded.
pub fn run_pipeline(
    source: &dyn ActivitySource,
    config: &SessionConfig,
    sink: &mut dyn SessionSink,
) -> Result<SessionsPayload> {
    let activities = source.fetch()?;
    tracing::debug!(count = activities.len(), "received activities");

    let payload = compute_sessions(activities, config).context("failed to compute sessions")?;

    sink.submit(&payload)?;
    Ok(payload)
}

/// The remote activities service, usable as both source and sink.
#[derive(Debug)]
pub struct ApiGateway {
    client: Client,
    runtime: Runtime,
}

impl ApiGateway {
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_url = non_empty(config.api_url.as_deref())
            .ok_or_else(|| anyhow::anyhow!("missing API URL (set SESSIONS_API_URL or config.toml)"))?;
        let api_key = non_empty(config.api_key.as_deref())
            .ok_or_else(|| anyhow::anyhow!("missing API key (set SESSIONS_API_KEY or config.toml)"))?;

        let client = Client::new(api_url, api_key).context("failed to create API client")?;
        let runtime = Runtime::new().context("failed to initialize tokio runtime")?;
        Ok(Self { client, runtime })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

impl ActivitySource for ApiGateway {
    fn fetch(&self) -> Result<Vec<RawActivity>> {
        self.runtime
            .block_on(self.client.fetch_activities())
            .context("failed to fetch activities")
    }
}

// Submitting needs no exclusive access, so a shared gateway can be both
// the source and the sink of one run.
impl SessionSink for &ApiGateway {
    fn submit(&mut self, payload: &SessionsPayload) -> Result<()> {
        self.runtime
            .block_on(self.client.submit_sessions(payload))
            .context("failed to submit sessions")?;
        tracing::info!(
            users = payload.user_sessions.len(),
            sessions = payload.session_count(),
            "sessions submitted"
        );
        Ok(())
    }
}

/// Activities read from a JSON file, or stdin when no path (or `-`) is given.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: Option<PathBuf>,
}

impl FileSource {
    pub fn new(path: Option<PathBuf>) -> Self {
        let path = path.filter(|p| p.as_os_str() != "-");
        Self { path }
    }
}

impl ActivitySource for FileSource {
    fn fetch(&self) -> Result<Vec<RawActivity>> {
        let (content, origin) = match &self.path {
            Some(path) => (
                fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                path.display().to_string(),
            ),
            None => {
                let mut content = String::new();
                io::stdin()
                    .read_to_string(&mut content)
                    .context("failed to read stdin")?;
                (content, "stdin".to_string())
            }
        };
        parse_activities(&content).with_context(|| format!("invalid activities in {origin}"))
    }
}

/// Accepted document shapes: the service's `{"activities": [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ActivitiesDocument {
    Wrapped { activities: Vec<RawActivity> },
    Bare(Vec<RawActivity>),
}

pub fn parse_activities(content: &str) -> Result<Vec<RawActivity>, serde_json::Error> {
    let document: ActivitiesDocument = serde_json::from_str(content)?;
    Ok(match document {
        ActivitiesDocument::Wrapped { activities } | ActivitiesDocument::Bare(activities) => {
            activities
        }
    })
}

/// Writes the payload to a stream instead of submitting it.
pub struct WriterSink<'a, W: Write> {
    writer: &'a mut W,
    format: OutputFormat,
    pretty: bool,
}

impl<'a, W: Write> WriterSink<'a, W> {
    pub const fn new(writer: &'a mut W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
        }
    }
}

impl<W: Write> SessionSink for WriterSink<'_, W> {
    fn submit(&mut self, payload: &SessionsPayload) -> Result<()> {
        let output = render(payload, self.format, self.pretty)?;
        self.writer
            .write_all(output.as_bytes())
            .context("failed to write sessions")?;
        self.writer.flush().context("failed to flush output")?;
        Ok(())
    }
}
