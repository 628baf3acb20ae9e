use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::{ProbeResult, RunReport};

/// Standard percentile labels.
const PERCENTILE_P50: u64 = 50;
const PERCENTILE_P90: u64 = 90;
const PERCENTILE_P99: u64 = 99;
/// Rounding offset for percentile selection.
const PERCENTILE_ROUNDING: u64 = 50;
const PERCENT_DIVISOR: u64 = 100;

/// What the chart and the result log consume from a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary<'a> {
    /// Latencies of successful probes, ascending by sequence number.
    pub ordered_latencies: Vec<Duration>,
    pub results: &'a [ProbeResult],
}

#[must_use]
pub fn summarize(report: &RunReport) -> RunSummary<'_> {
    let ordered_latencies = report
        .results
        .iter()
        .filter_map(ProbeResult::latency)
        .collect();
    RunSummary {
        ordered_latencies,
        results: &report.results,
    }
}

/// Aggregate figures for the console summary. Latency fields are `None` when
/// no probe succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub total: u64,
    pub successes: u64,
    pub failures: u64,
    pub min: Option<Duration>,
    pub avg: Option<Duration>,
    pub max: Option<Duration>,
    pub p50: Option<Duration>,
    pub p90: Option<Duration>,
    pub p99: Option<Duration>,
    pub status_counts: BTreeMap<u16, u64>,
}

impl RunStats {
    #[must_use]
    pub fn from_report(report: &RunReport) -> Self {
        let mut latencies: Vec<Duration> = report
            .results
            .iter()
            .filter_map(ProbeResult::latency)
            .collect();
        latencies.sort_unstable();

        let mut status_counts = BTreeMap::new();
        for code in report.results.iter().filter_map(ProbeResult::status_code) {
            let count = status_counts.entry(code).or_insert(0_u64);
            *count = count.saturating_add(1);
        }

        let total = u64::try_from(report.results.len()).unwrap_or(u64::MAX);
        let successes = u64::try_from(latencies.len()).unwrap_or(u64::MAX);

        Self {
            total,
            successes,
            failures: total.saturating_sub(successes),
            min: latencies.first().copied(),
            avg: average(&latencies),
            max: latencies.last().copied(),
            p50: percentile(&latencies, PERCENTILE_P50),
            p90: percentile(&latencies, PERCENTILE_P90),
            p99: percentile(&latencies, PERCENTILE_P99),
            status_counts,
        }
    }

    /// Success share scaled by 100, e.g. `9_950` for 99.50%.
    #[must_use]
    pub fn success_rate_x100(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        let scaled = u128::from(self.successes)
            .saturating_mul(10_000)
            .checked_div(u128::from(self.total))
            .unwrap_or(0);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }
}

fn average(values: &[Duration]) -> Option<Duration> {
    if values.is_empty() {
        return None;
    }
    let total_nanos = values
        .iter()
        .fold(0_u128, |acc, value| acc.saturating_add(value.as_nanos()));
    let count = u128::try_from(values.len()).ok()?;
    let avg = total_nanos.checked_div(count)?;
    Some(Duration::from_nanos(u64::try_from(avg).unwrap_or(u64::MAX)))
}

/// Nearest-rank percentile over sorted values.
fn percentile(sorted: &[Duration], percentile: u64) -> Option<Duration> {
    if sorted.is_empty() {
        return None;
    }
    let count = u64::try_from(sorted.len().saturating_sub(1)).unwrap_or(u64::MAX);
    let index = percentile
        .saturating_mul(count)
        .saturating_add(PERCENTILE_ROUNDING)
        .checked_div(PERCENT_DIVISOR)
        .unwrap_or(0);
    let idx = usize::try_from(index).unwrap_or_else(|_| sorted.len().saturating_sub(1));
    sorted.get(idx).or_else(|| sorted.last()).copied()
}
