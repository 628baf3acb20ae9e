use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::resolver::dedup_preserving_order;
use super::*;
use crate::args::{PositiveU64, PositiveUsize};
use crate::domain::{ProbeOutcome, ProbeRequest, ProbeResult, Target};
use crate::error::{AppError, AppResult, ResolveError};
use crate::report::summarize;
use crate::sinks::ResultObserver;
use crate::sinks::memory::MemoryEventSink;

fn ip(value: [u8; 4]) -> IpAddr {
    IpAddr::from(value)
}

fn positive_u64(value: u64) -> AppResult<PositiveU64> {
    Ok(PositiveU64::try_from(value)?)
}

fn positive_usize(value: usize) -> AppResult<PositiveUsize> {
    Ok(PositiveUsize::try_from(value)?)
}

struct FixedResolver {
    addresses: Vec<IpAddr>,
    calls: AtomicUsize,
}

impl FixedResolver {
    fn new(addresses: Vec<IpAddr>) -> Self {
        Self {
            addresses,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AddressResolver for FixedResolver {
    async fn resolve(&self, _target: &Target) -> Result<Vec<IpAddr>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.addresses.clone())
    }
}

struct FailingResolver;

#[async_trait]
impl AddressResolver for FailingResolver {
    async fn resolve(&self, target: &Target) -> Result<Vec<IpAddr>, ResolveError> {
        Err(ResolveError::NoAddresses {
            host: target.raw().to_owned(),
        })
    }
}

/// Records concurrency and fails every sequence listed in `fail`.
struct InstrumentedExecutor {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
    fail: Vec<u64>,
    delay_for: fn(u64) -> Duration,
}

impl InstrumentedExecutor {
    fn new(fail: Vec<u64>, delay_for: fn(u64) -> Duration) -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            fail,
            delay_for,
        }
    }
}

#[async_trait]
impl ProbeExecutor for InstrumentedExecutor {
    async fn probe(&self, request: ProbeRequest) -> ProbeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.peak.fetch_max(now, Ordering::SeqCst);
        let delay = (self.delay_for)(request.sequence);
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let outcome = if self.fail.contains(&request.sequence) {
            ProbeOutcome::Failure {
                error: "simulated failure".to_owned(),
                timestamp: Local::now(),
            }
        } else {
            ProbeOutcome::Success {
                status_code: 200,
                reason_phrase: "OK".to_owned(),
                latency: delay,
                timestamp: Local::now(),
            }
        };
        ProbeResult::new(request, outcome)
    }
}

#[derive(Default)]
struct ArrivalRecorder {
    sequences: Mutex<Vec<u64>>,
}

impl ResultObserver for ArrivalRecorder {
    fn on_result(&self, result: &ProbeResult) {
        if let Ok(mut sequences) = self.sequences.lock() {
            sequences.push(result.sequence);
        }
    }
}

fn short_delay(_sequence: u64) -> Duration {
    Duration::from_millis(5)
}

/// Earlier sequences take longer so completions arrive out of order.
fn reverse_delay(sequence: u64) -> Duration {
    Duration::from_millis(40_u64.saturating_sub(sequence.saturating_mul(10)))
}

#[test]
fn assign_address_is_round_robin_modulo() -> AppResult<()> {
    let addresses = [ip([10, 0, 0, 1]), ip([10, 0, 0, 2]), ip([10, 0, 0, 3])];
    for sequence in 1..=9_u64 {
        let expected = addresses
            .get(usize::try_from(sequence % 3).unwrap_or(0))
            .copied();
        if assign_address(&addresses, sequence) != expected {
            return Err(AppError::validation(format!(
                "Unexpected address for sequence {}",
                sequence
            )));
        }
    }
    if assign_address(&[], 1).is_some() {
        return Err(AppError::validation("Expected no address for empty set"));
    }
    Ok(())
}

#[test]
fn dedup_keeps_first_occurrence_order() -> AppResult<()> {
    let deduped = dedup_preserving_order([
        ip([10, 0, 0, 2]),
        ip([10, 0, 0, 1]),
        ip([10, 0, 0, 2]),
        ip([10, 0, 0, 3]),
        ip([10, 0, 0, 1]),
    ]);
    if deduped != [ip([10, 0, 0, 2]), ip([10, 0, 0, 1]), ip([10, 0, 0, 3])] {
        return Err(AppError::validation(format!("Unexpected order {:?}", deduped)));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn two_address_scenario_assigns_and_orders() -> AppResult<()> {
    let resolver = Arc::new(FixedResolver::new(vec![ip([10, 0, 0, 1]), ip([10, 0, 0, 2])]));
    let executor = Arc::new(InstrumentedExecutor::new(Vec::new(), reverse_delay));
    let events = Arc::new(MemoryEventSink::default());
    let arrivals = Arc::new(ArrivalRecorder::default());
    let scheduler = ProbeScheduler::new(resolver.clone(), executor, events)
        .with_observer(arrivals.clone());

    let target = Target::new("example.test")?;
    let report = scheduler
        .run(&target, positive_u64(4)?, positive_usize(2)?)
        .await?;

    let sequences: Vec<u64> = report.results.iter().map(|result| result.sequence).collect();
    if sequences != [1, 2, 3, 4] {
        return Err(AppError::validation(format!("Unexpected order {:?}", sequences)));
    }
    let assigned: Vec<IpAddr> = report.results.iter().map(|result| result.assigned_ip).collect();
    let expected = [
        ip([10, 0, 0, 2]),
        ip([10, 0, 0, 1]),
        ip([10, 0, 0, 2]),
        ip([10, 0, 0, 1]),
    ];
    if assigned != expected {
        return Err(AppError::validation(format!("Unexpected IPs {:?}", assigned)));
    }
    if resolver.calls.load(Ordering::SeqCst) != 1 {
        return Err(AppError::validation("Expected a single resolution"));
    }
    let arrived = arrivals
        .sequences
        .lock()
        .map(|sequences| sequences.len())
        .unwrap_or(0);
    if arrived != 4 {
        return Err(AppError::validation("Expected observer to see every result"));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_sequence_reported_exactly_once() -> AppResult<()> {
    for (total, workers) in [(1_u64, 1_usize), (7, 3), (25, 4), (3, 10)] {
        let resolver = Arc::new(FixedResolver::new(vec![
            ip([10, 0, 0, 1]),
            ip([10, 0, 0, 2]),
            ip([10, 0, 0, 3]),
        ]));
        let executor = Arc::new(InstrumentedExecutor::new(Vec::new(), short_delay));
        let scheduler =
            ProbeScheduler::new(resolver, executor.clone(), Arc::new(MemoryEventSink::default()));
        let target = Target::new("example.test")?;
        let report = scheduler
            .run(&target, positive_u64(total)?, positive_usize(workers)?)
            .await?;

        let sequences: Vec<u64> = report.results.iter().map(|result| result.sequence).collect();
        let expected: Vec<u64> = (1..=total).collect();
        if sequences != expected {
            return Err(AppError::validation(format!(
                "N={} workers={}: unexpected sequences {:?}",
                total, workers, sequences
            )));
        }
        let calls = u64::try_from(executor.calls.load(Ordering::SeqCst)).unwrap_or(u64::MAX);
        if calls != total {
            return Err(AppError::validation(format!(
                "Expected {} probes, executed {}",
                total, calls
            )));
        }
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_never_exceeds_worker_count() -> AppResult<()> {
    let resolver = Arc::new(FixedResolver::new(vec![ip([10, 0, 0, 1])]));
    let executor = Arc::new(InstrumentedExecutor::new(Vec::new(), |_| {
        Duration::from_millis(15)
    }));
    let scheduler =
        ProbeScheduler::new(resolver, executor.clone(), Arc::new(MemoryEventSink::default()));
    let target = Target::new("example.test")?;
    scheduler
        .run(&target, positive_u64(24)?, positive_usize(3)?)
        .await?;

    let peak = executor.peak.load(Ordering::SeqCst);
    if peak == 0 || peak > 3 {
        return Err(AppError::validation(format!("Unexpected peak concurrency {}", peak)));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn resolution_failure_dispatches_nothing() -> AppResult<()> {
    let executor = Arc::new(InstrumentedExecutor::new(Vec::new(), short_delay));
    let events = Arc::new(MemoryEventSink::default());
    let scheduler = ProbeScheduler::new(Arc::new(FailingResolver), executor.clone(), events.clone());
    let target = Target::new("missing.invalid")?;

    let result = scheduler
        .run(&target, positive_u64(5)?, positive_usize(2)?)
        .await;
    if result.is_ok() {
        return Err(AppError::validation("Expected resolution failure"));
    }
    if executor.calls.load(Ordering::SeqCst) != 0 {
        return Err(AppError::validation("Expected zero probes"));
    }
    if events.probe_outcomes() != 0 {
        return Err(AppError::validation("Expected no probe outcome events"));
    }
    if events.events().len() != 1 {
        return Err(AppError::validation("Expected one resolution failure event"));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn empty_address_set_is_a_resolution_failure() -> AppResult<()> {
    let resolver = Arc::new(FixedResolver::new(Vec::new()));
    let executor = Arc::new(InstrumentedExecutor::new(Vec::new(), short_delay));
    let events = Arc::new(MemoryEventSink::default());
    let scheduler = ProbeScheduler::new(resolver.clone(), executor.clone(), events.clone());
    let target = Target::new("empty.test")?;

    let result = scheduler
        .run(&target, positive_u64(4)?, positive_usize(2)?)
        .await;
    let Err(err) = result else {
        return Err(AppError::validation("Expected resolution failure"));
    };
    if !matches!(&err, ResolveError::NoAddresses { host } if host == "empty.test") {
        return Err(AppError::validation(format!("Unexpected error {}", err)));
    }
    if resolver.calls.load(Ordering::SeqCst) != 1 {
        return Err(AppError::validation("Expected a single resolution"));
    }
    if executor.calls.load(Ordering::SeqCst) != 0 {
        return Err(AppError::validation("Expected zero requests"));
    }
    if events.probe_outcomes() != 0 {
        return Err(AppError::validation("Expected no outcome events"));
    }
    if events.events().len() != 1 {
        return Err(AppError::validation("Expected one resolution failure event"));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failures_are_kept_but_excluded_from_latencies() -> AppResult<()> {
    let resolver = Arc::new(FixedResolver::new(vec![ip([10, 0, 0, 1])]));
    let executor = Arc::new(InstrumentedExecutor::new(vec![2, 5], short_delay));
    let scheduler = ProbeScheduler::new(resolver, executor, Arc::new(MemoryEventSink::default()));
    let target = Target::new("example.test")?;
    let report = scheduler
        .run(&target, positive_u64(6)?, positive_usize(2)?)
        .await?;

    let summary = summarize(&report);
    if summary.results.len() != 6 {
        return Err(AppError::validation("Expected every result in the full log"));
    }
    if summary.ordered_latencies.len() != 6_usize.saturating_sub(report.failure_count()) {
        return Err(AppError::validation("Latency count must exclude failures"));
    }
    if summary.ordered_latencies.len() != 4 {
        return Err(AppError::validation("Expected four latencies"));
    }
    Ok(())
}

async fn spawn_status_server(status_line: &'static str) -> AppResult<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buffer = [0u8; 1024];
                if stream.read(&mut buffer).await.is_err() {
                    return;
                }
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK",
                    status_line
                );
                drop(stream.write_all(response.as_bytes()).await);
                drop(stream.shutdown().await);
            });
        }
    });
    Ok(format!("http://{}", addr))
}

/// Accepts connections and never answers.
async fn spawn_silent_server() -> AppResult<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    Ok(format!("http://{}", addr))
}

fn request_for(url: &str, sequence: u64) -> AppResult<ProbeRequest> {
    Ok(ProbeRequest {
        sequence,
        target: Target::new(url)?,
        assigned_ip: ip([127, 0, 0, 1]),
    })
}

#[tokio::test(flavor = "current_thread")]
async fn http_probe_records_success_and_logs() -> AppResult<()> {
    let url = spawn_status_server("200 OK").await?;
    let events = Arc::new(MemoryEventSink::default());
    let executor = HttpProbeExecutor::new(events.clone())?;

    let result = executor.probe(request_for(&url, 1)?).await;
    match &result.outcome {
        ProbeOutcome::Success {
            status_code,
            reason_phrase,
            ..
        } if *status_code == 200 && reason_phrase == "OK" => {}
        other => {
            return Err(AppError::http(format!("Unexpected outcome {:?}", other)));
        }
    }
    if result.latency().is_none() {
        return Err(AppError::http("Expected latency for success"));
    }
    if events.probe_outcomes() != 1 {
        return Err(AppError::http("Expected exactly one probe event"));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn http_error_status_is_still_a_success_outcome() -> AppResult<()> {
    let url = spawn_status_server("404 Not Found").await?;
    let executor = HttpProbeExecutor::new(Arc::new(MemoryEventSink::default()))?;

    let result = executor.probe(request_for(&url, 3)?).await;
    if result.status_code() != Some(404) {
        return Err(AppError::http(format!("Unexpected outcome {:?}", result.outcome)));
    }
    if result.sequence != 3 || result.assigned_ip != ip([127, 0, 0, 1]) {
        return Err(AppError::http("Expected request identity to be preserved"));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn refused_connection_becomes_failure() -> AppResult<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    let events = Arc::new(MemoryEventSink::default());
    let executor = HttpProbeExecutor::new(events.clone())?;

    let result = executor
        .probe(request_for(&format!("http://{}", addr), 1)?)
        .await;
    match &result.outcome {
        ProbeOutcome::Failure { error, .. } if !error.is_empty() => {}
        other => {
            return Err(AppError::http(format!("Expected failure, got {:?}", other)));
        }
    }
    if events.probe_outcomes() != 1 {
        return Err(AppError::http("Expected failure to be logged"));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn timed_out_probe_is_failure_without_latency() -> AppResult<()> {
    let url = spawn_silent_server().await?;
    let executor = HttpProbeExecutor::with_timeout(
        Arc::new(MemoryEventSink::default()),
        Duration::from_millis(200),
    )?;

    let result = executor.probe(request_for(&url, 1)?).await;
    match &result.outcome {
        ProbeOutcome::Failure { error, .. } if !error.is_empty() => {}
        other => {
            return Err(AppError::http(format!("Expected timeout failure, got {:?}", other)));
        }
    }
    if result.latency().is_some() {
        return Err(AppError::http("Timed-out probe must not carry a latency"));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn system_resolver_handles_ip_literals() -> AppResult<()> {
    let target = Target::new("127.0.0.1:8080")?;
    let addresses = SystemResolver.resolve(&target).await?;
    if addresses != [ip([127, 0, 0, 1])] {
        return Err(AppError::validation(format!("Unexpected addresses {:?}", addresses)));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn system_resolver_reports_unknown_hosts() -> AppResult<()> {
    let target = Target::new("pingreport-test.invalid")?;
    if SystemResolver.resolve(&target).await.is_ok() {
        return Err(AppError::validation("Expected .invalid host to fail"));
    }
    Ok(())
}
