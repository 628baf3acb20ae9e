use std::net::IpAddr;

use chrono::{DateTime, Local};

use crate::domain::{ProbeOutcome, ProbeResult, Target};
use crate::error::ResolveError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Receives structured run events. Implementations must not block.
pub trait EventSink: Send + Sync {
    fn record(&self, event: LogEvent);
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub at: DateTime<Local>,
    pub record: EventRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventRecord {
    Resolved {
        target: String,
        addresses: Vec<IpAddr>,
    },
    ResolutionFailed {
        target: String,
        error: String,
    },
    Probe(ProbeResult),
}

impl LogEvent {
    #[must_use]
    pub fn resolved(target: &Target, addresses: &[IpAddr]) -> Self {
        Self::now(EventRecord::Resolved {
            target: target.raw().to_owned(),
            addresses: addresses.to_vec(),
        })
    }

    #[must_use]
    pub fn resolution_failed(target: &Target, error: &ResolveError) -> Self {
        Self::now(EventRecord::ResolutionFailed {
            target: target.raw().to_owned(),
            error: error.to_string(),
        })
    }

    #[must_use]
    pub fn probe(result: &ProbeResult) -> Self {
        Self::now(EventRecord::Probe(result.clone()))
    }

    fn now(record: EventRecord) -> Self {
        Self {
            at: Local::now(),
            record,
        }
    }

    #[must_use]
    pub const fn is_probe_outcome(&self) -> bool {
        matches!(self.record, EventRecord::Probe(_))
    }

    /// Message body of the log line, without the leading timestamp.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.record {
            EventRecord::Resolved { target, addresses } => {
                let joined = addresses
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Resolved IP addresses for {}: [{}]", target, joined)
            }
            EventRecord::ResolutionFailed { target, error } => {
                format!("Error: Unable to resolve IP address for {}: {}", target, error)
            }
            EventRecord::Probe(result) => match &result.outcome {
                ProbeOutcome::Success {
                    status_code,
                    latency,
                    timestamp,
                    ..
                } => format!(
                    "Request #{} to {} with IP {} completed in {} ms with status code {} at {}",
                    result.sequence,
                    result.target,
                    result.assigned_ip,
                    crate::domain::format_millis(*latency),
                    status_code,
                    timestamp.format(TIMESTAMP_FORMAT)
                ),
                ProbeOutcome::Failure { error, timestamp } => format!(
                    "Request #{} to {} with IP {} failed: {} at {}",
                    result.sequence,
                    result.target,
                    result.assigned_ip,
                    error,
                    timestamp.format(TIMESTAMP_FORMAT)
                ),
            },
        }
    }
}
