//! Structured events emitted by a probe session.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// Severity of a [`LogEvent`], as used by shells to style the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Info,
    Success,
    Error,
}

/// One entry of a session's event stream.
///
/// Once delivered an event belongs to the receiver; the session keeps no
/// reference to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub kind: LogKind,
    /// the session's sequence number at the time the event was emitted
    pub sequence: u64,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LogEvent {
    /// new event stamped with the current time
    pub fn new(kind: LogKind, message: impl Into<String>, sequence: u64) -> Self {
        Self::at(Utc::now(), kind, message, sequence)
    }

    pub fn at(
        timestamp: DateTime<Utc>,
        kind: LogKind,
        message: impl Into<String>,
        sequence: u64,
    ) -> Self {
        Self {
            timestamp,
            message: message.into(),
            kind,
            sequence,
        }
    }

    /// ISO-8601 timestamp, UTC, millisecond precision:
    /// `2024-05-01T12:00:00.250Z`.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// The human readable text of every event a session emits.
pub mod messages {
    use crate::{
        defaults::{REPLY_BYTES, REPLY_TTL},
        measure::Latency,
        target::Target,
    };

    pub const ALREADY_RUNNING: &str = "Ping is already running";
    pub const NOT_RUNNING: &str = "No ping operation is running";
    pub const STOPPED: &str = "Ping stopped.";

    pub fn invalid_target(input: &str) -> String {
        format!("Invalid IP address or hostname: {input}")
    }

    pub fn starting(target: &Target) -> String {
        format!("Starting ping to {target}...")
    }

    pub fn header(target: &Target) -> String {
        format!("PING {target} 56(84) bytes of data.")
    }

    pub fn reply(target: &Target, latency: Latency) -> String {
        format!(
            "Reply from {target}: bytes={REPLY_BYTES} time={ms}ms TTL={REPLY_TTL}",
            ms = latency.as_millis()
        )
    }

    pub fn timeout(sequence: u64) -> String {
        format!("Request timeout for icmp_seq {sequence}")
    }

    pub fn cycle_fault(error: &dyn std::error::Error) -> String {
        format!("Error during ping: {error}")
    }

    pub fn statistics_header(target: &Target) -> String {
        format!("\n--- {target} ping statistics ---")
    }

    pub fn transmitted(packets: u64) -> String {
        format!("{packets} packets transmitted")
    }
}
