use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::args::{PositiveU64, PositiveUsize};
use crate::domain::{ProbeRequest, ProbeResult, RunReport, RunReportBuilder, Target};
use crate::error::ResolveError;
use crate::sinks::{EventSink, LogEvent, ResultObserver};

use super::{AddressResolver, ProbeExecutor};

/// Address labeling sequence `sequence`: `addresses[sequence mod len]`.
#[must_use]
pub fn assign_address(addresses: &[IpAddr], sequence: u64) -> Option<IpAddr> {
    let len = u64::try_from(addresses.len()).ok()?;
    let index = sequence.checked_rem(len)?;
    addresses.get(usize::try_from(index).ok()?).copied()
}

/// Resolves a target once, fans probes out over a bounded worker pool and
/// reassembles the results in sequence order.
pub struct ProbeScheduler {
    resolver: Arc<dyn AddressResolver>,
    executor: Arc<dyn ProbeExecutor>,
    events: Arc<dyn EventSink>,
    observer: Option<Arc<dyn ResultObserver>>,
}

impl ProbeScheduler {
    #[must_use]
    pub fn new(
        resolver: Arc<dyn AddressResolver>,
        executor: Arc<dyn ProbeExecutor>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            resolver,
            executor,
            events,
            observer: None,
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ResultObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Runs `total_requests` probes with at most `max_workers` in flight.
    ///
    /// Suspends until every probe has completed. Individual probe failures are
    /// part of the report; only a resolution failure aborts the run, before
    /// any probe is dispatched.
    ///
    /// # Errors
    ///
    /// Returns the [`ResolveError`] when the target cannot be resolved.
    pub async fn run(
        &self,
        target: &Target,
        total_requests: PositiveU64,
        max_workers: PositiveUsize,
    ) -> Result<RunReport, ResolveError> {
        let resolved = self.resolver.resolve(target).await.and_then(|addresses| {
            if addresses.is_empty() {
                Err(ResolveError::NoAddresses {
                    host: target.raw().to_owned(),
                })
            } else {
                Ok(addresses)
            }
        });
        let addresses = match resolved {
            Ok(addresses) => addresses,
            Err(err) => {
                error!("Unable to resolve {}: {}", target, err);
                self.events.record(LogEvent::resolution_failed(target, &err));
                return Err(err);
            }
        };
        info!(
            "Resolved {} to {} address(es): {:?}",
            target,
            addresses.len(),
            addresses
        );
        self.events.record(LogEvent::resolved(target, &addresses));
        let addresses: Arc<[IpAddr]> = Arc::from(addresses);

        let total = total_requests.get();
        let worker_count = max_workers
            .get()
            .min(usize::try_from(total).unwrap_or(usize::MAX));
        let next_sequence = Arc::new(AtomicU64::new(1));
        let (result_tx, mut result_rx) = mpsc::channel::<ProbeResult>(worker_count);
        let mut pool = JoinSet::new();

        for worker_id in 0..worker_count {
            let worker = Worker {
                target: target.clone(),
                addresses: addresses.clone(),
                executor: self.executor.clone(),
                next_sequence: next_sequence.clone(),
                total,
                result_tx: result_tx.clone(),
            };
            pool.spawn(async move {
                let completed = worker.run().await;
                debug!("Worker {} finished after {} probe(s)", worker_id, completed);
            });
        }
        drop(result_tx);

        let mut builder = RunReportBuilder::new(target.clone(), addresses, total);
        while let Some(result) = result_rx.recv().await {
            if let Some(observer) = self.observer.as_ref() {
                observer.on_result(&result);
            }
            let sequence = result.sequence;
            if !builder.record(result) {
                warn!("Dropped unexpected result for sequence {}", sequence);
            }
        }

        while let Some(joined) = pool.join_next().await {
            if let Err(err) = joined {
                error!("Probe worker failed: {}", err);
            }
        }

        let received = u64::try_from(builder.received()).unwrap_or(u64::MAX);
        if received < total {
            warn!(
                "{} probe(s) never reported; recording them as failures",
                total.saturating_sub(received)
            );
        }
        Ok(builder.finalize())
    }
}

struct Worker {
    target: Target,
    addresses: Arc<[IpAddr]>,
    executor: Arc<dyn ProbeExecutor>,
    next_sequence: Arc<AtomicU64>,
    total: u64,
    result_tx: mpsc::Sender<ProbeResult>,
}

impl Worker {
    /// Pulls sequence numbers until the queue is drained; one probe at a time.
    async fn run(self) -> u64 {
        let mut completed: u64 = 0;
        loop {
            let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
            if sequence == 0 || sequence > self.total {
                break;
            }
            let Some(assigned_ip) = assign_address(&self.addresses, sequence) else {
                break;
            };
            let request = ProbeRequest {
                sequence,
                target: self.target.clone(),
                assigned_ip,
            };
            let result = self.executor.probe(request).await;
            completed = completed.saturating_add(1);
            if self.result_tx.send(result).await.is_err() {
                break;
            }
        }
        completed
    }
}
