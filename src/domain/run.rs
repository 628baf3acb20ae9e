use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;

use chrono::Local;

use super::{ProbeOutcome, ProbeResult, Target};

/// Error text recorded for a sequence whose worker never reported back.
pub const MISSING_RESULT_ERROR: &str = "probe task ended without reporting a result";

/// Every probe of one run, ordered by sequence number.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub target: Target,
    pub addresses: Arc<[IpAddr]>,
    pub results: Vec<ProbeResult>,
}

impl RunReport {
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.results
            .iter()
            .filter(|result| !result.is_success())
            .count()
    }
}

/// Accumulates results in arrival order and hands back a dense, sorted report.
///
/// Owned by a single collector; workers never touch it directly.
#[derive(Debug)]
pub struct RunReportBuilder {
    target: Target,
    addresses: Arc<[IpAddr]>,
    total_requests: u64,
    slots: BTreeMap<u64, ProbeResult>,
}

impl RunReportBuilder {
    #[must_use]
    pub const fn new(target: Target, addresses: Arc<[IpAddr]>, total_requests: u64) -> Self {
        Self {
            target,
            addresses,
            total_requests,
            slots: BTreeMap::new(),
        }
    }

    /// Stores a result. Returns `false` for out-of-range or duplicate sequences,
    /// which are dropped.
    pub fn record(&mut self, result: ProbeResult) -> bool {
        if result.sequence == 0 || result.sequence > self.total_requests {
            return false;
        }
        if self.slots.contains_key(&result.sequence) {
            return false;
        }
        self.slots.insert(result.sequence, result);
        true
    }

    #[must_use]
    pub fn received(&self) -> usize {
        self.slots.len()
    }

    /// Orders the results by sequence and fills any gap with a failure so that
    /// every sequence in `1..=total_requests` appears exactly once.
    #[must_use]
    pub fn finalize(mut self) -> RunReport {
        let mut results = Vec::with_capacity(self.slots.len());
        for sequence in 1..=self.total_requests {
            let result = match self.slots.remove(&sequence) {
                Some(result) => result,
                None => self.missing(sequence),
            };
            results.push(result);
        }
        RunReport {
            target: self.target,
            addresses: self.addresses,
            results,
        }
    }

    fn missing(&self, sequence: u64) -> ProbeResult {
        let assigned_ip = crate::http::assign_address(&self.addresses, sequence)
            .unwrap_or(IpAddr::from([0, 0, 0, 0]));
        ProbeResult {
            sequence,
            target: self.target.clone(),
            assigned_ip,
            outcome: ProbeOutcome::Failure {
                error: MISSING_RESULT_ERROR.to_owned(),
                timestamp: Local::now(),
            },
        }
    }
}
