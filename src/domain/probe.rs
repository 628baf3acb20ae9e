use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, Local};

use super::Target;

/// One unit of work handed to a probe executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub sequence: u64,
    pub target: Target,
    /// Label only; the HTTP client resolves the host on its own.
    pub assigned_ip: IpAddr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Success {
        status_code: u16,
        reason_phrase: String,
        latency: Duration,
        /// When the request was started.
        timestamp: DateTime<Local>,
    },
    Failure {
        error: String,
        /// When the failure was observed.
        timestamp: DateTime<Local>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub sequence: u64,
    pub target: Target,
    pub assigned_ip: IpAddr,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    #[must_use]
    pub fn new(request: ProbeRequest, outcome: ProbeOutcome) -> Self {
        Self {
            sequence: request.sequence,
            target: request.target,
            assigned_ip: request.assigned_ip,
            outcome,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Success { .. })
    }

    #[must_use]
    pub const fn latency(&self) -> Option<Duration> {
        match &self.outcome {
            ProbeOutcome::Success { latency, .. } => Some(*latency),
            ProbeOutcome::Failure { .. } => None,
        }
    }

    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match &self.outcome {
            ProbeOutcome::Success { status_code, .. } => Some(*status_code),
            ProbeOutcome::Failure { .. } => None,
        }
    }

    #[must_use]
    pub const fn timestamp(&self) -> &DateTime<Local> {
        match &self.outcome {
            ProbeOutcome::Success { timestamp, .. } | ProbeOutcome::Failure { timestamp, .. } => {
                timestamp
            }
        }
    }
}

/// Hundredths of a millisecond per millisecond.
const HUNDREDTHS_PER_MS: u128 = 100;
/// Microseconds per hundredth of a millisecond.
const MICROS_PER_HUNDREDTH: u128 = 10;
/// Half a hundredth, for rounding to the nearest one.
const HALF_HUNDREDTH_MICROS: u128 = 5;

/// Milliseconds with two decimals (`12.34`), rounded to the nearest hundredth.
#[must_use]
pub fn format_millis(duration: Duration) -> String {
    let hundredths = duration
        .as_micros()
        .saturating_add(HALF_HUNDREDTH_MICROS)
        .checked_div(MICROS_PER_HUNDREDTH)
        .unwrap_or(0);
    format!(
        "{}.{:02}",
        hundredths / HUNDREDTHS_PER_MS,
        hundredths % HUNDREDTHS_PER_MS
    )
}
