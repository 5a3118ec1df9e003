//! Output rendering for computed sessions.

use std::fmt::Write;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use sessions_core::{Session, SessionsPayload};

/// Output format for printed sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// The `user_sessions` JSON payload.
    #[default]
    Json,
    /// Human-readable summary.
    Text,
}

/// Renders the payload, always ending with a newline.
pub fn render(payload: &SessionsPayload, format: OutputFormat, pretty: bool) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut output = if pretty {
                serde_json::to_string_pretty(payload)?
            } else {
                serde_json::to_string(payload)?
            };
            output.push('\n');
            Ok(output)
        }
        OutputFormat::Text => Ok(format_text(payload)),
    }
}

// ========== Duration Formatting ==========

/// Formats milliseconds as "Xh Ym Zs", dropping leading zero units.
/// Sub-second remainders are floored.
pub fn format_duration(ms: i64) -> String {
    let total_seconds = ms.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes >= 1 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub(crate) fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

fn session_total_ms(sessions: &[Session]) -> i64 {
    sessions
        .iter()
        .map(|s| s.duration_seconds.as_millis())
        .sum()
}

// ========== Text Output ==========

/// Formats the human-readable session listing.
pub fn format_text(payload: &SessionsPayload) -> String {
    let mut output = String::new();

    if payload.user_sessions.is_empty() {
        writeln!(output, "No sessions.").unwrap();
        return output;
    }

    writeln!(output, "SESSIONS").unwrap();
    writeln!(output, "────────").unwrap();
    for (user_id, sessions) in &payload.user_sessions {
        writeln!(
            output,
            "{user_id}  {}  {}",
            plural(sessions.len(), "session"),
            format_duration(session_total_ms(sessions))
        )
        .unwrap();
        for session in sessions {
            let ids = session
                .activity_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                output,
                "  {}  {}  {:>10}  [{ids}]",
                format_timestamp(session.started_at.instant()),
                format_timestamp(session.ended_at.instant()),
                format_duration(session.duration_seconds.as_millis()),
            )
            .unwrap();
        }
    }

    let total_ms: i64 = payload
        .user_sessions
        .values()
        .map(|sessions| session_total_ms(sessions))
        .sum();

    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "Users:    {}", payload.user_sessions.len()).unwrap();
    writeln!(output, "Sessions: {}", payload.session_count()).unwrap();
    writeln!(output, "Active:   {}", format_duration(total_ms)).unwrap();

    output
}
