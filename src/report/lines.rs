use std::time::Duration;

use crate::domain::{ProbeOutcome, ProbeResult, format_millis};

use super::RunStats;

const PERCENT_DIVISOR: u64 = 100;
const CONSOLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// One console line per probe result.
#[must_use]
pub fn result_line(result: &ProbeResult) -> String {
    match &result.outcome {
        ProbeOutcome::Success {
            status_code,
            reason_phrase,
            latency,
            timestamp,
        } => {
            let status = if reason_phrase.is_empty() {
                status_code.to_string()
            } else {
                format!("{} {}", status_code, reason_phrase)
            };
            format!(
                "Request #{} | {} | IP {} | {} | {} ms | {}",
                result.sequence,
                result.target,
                result.assigned_ip,
                status,
                format_millis(*latency),
                timestamp.format(CONSOLE_TIMESTAMP_FORMAT)
            )
        }
        ProbeOutcome::Failure { error, timestamp } => format!(
            "Request #{} | {} | IP {} | FAILED: {} | {}",
            result.sequence,
            result.target,
            result.assigned_ip,
            error,
            timestamp.format(CONSOLE_TIMESTAMP_FORMAT)
        ),
    }
}

#[must_use]
pub fn summary_lines(stats: &RunStats) -> Vec<String> {
    let mut lines = Vec::new();
    let rate = stats.success_rate_x100();

    lines.push(format!("Total Requests: {}", stats.total));
    lines.push(format!(
        "Successful: {} ({}.{:02}%)",
        stats.successes,
        rate / PERCENT_DIVISOR,
        rate % PERCENT_DIVISOR
    ));
    lines.push(format!("Failed: {}", stats.failures));
    lines.push(format!("Avg Latency: {}", format_latency(stats.avg)));
    lines.push(format!(
        "Min/Max Latency: {} / {}",
        format_latency(stats.min),
        format_latency(stats.max)
    ));
    lines.push(format!(
        "P50/P90/P99 Latency: {} / {} / {}",
        format_latency(stats.p50),
        format_latency(stats.p90),
        format_latency(stats.p99)
    ));
    if !stats.status_counts.is_empty() {
        let counts = stats
            .status_counts
            .iter()
            .map(|(code, count)| format!("{}={}", code, count))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Status Codes: {}", counts));
    }
    lines
}

pub fn print_summary(stats: &RunStats) {
    for line in summary_lines(stats) {
        println!("{}", line);
    }
}

fn format_latency(value: Option<Duration>) -> String {
    value.map_or_else(
        || "n/a".to_owned(),
        |latency| format!("{}ms", format_millis(latency)),
    )
}
