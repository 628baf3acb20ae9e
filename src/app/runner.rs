use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::args::ProbeArgs;
use crate::charts::{ChartSink, PngChartSink, default_chart_title};
use crate::domain::{RunReport, Target};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{HttpProbeExecutor, ProbeScheduler, SystemResolver};
use crate::report::{RunStats, print_summary, summarize};
use crate::sinks::{ConsoleObserver, EventLog, EventSink};

/// Runs one probe session: resolve, probe, then report to console, chart and
/// event log.
///
/// # Errors
///
/// Returns an error when the target is missing or cannot be resolved, or when
/// the event log cannot be opened or flushed.
pub(crate) async fn run_probe(args: &ProbeArgs) -> AppResult<()> {
    let url = args
        .url
        .as_deref()
        .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;
    let target = Target::new(url)?;

    let event_log = EventLog::open(Path::new(&args.log_file)).await?;
    info!("Logging probe events to {}", event_log.path().display());

    let outcome = execute(&target, args, event_log.sink()).await;
    let lines = event_log.close().await?;
    debug!("Event log closed after {} line(s)", lines);

    let report = match outcome {
        Ok(report) => report,
        Err(err) => {
            if matches!(err, AppError::Resolve(_)) {
                println!("Failed to resolve IP addresses. Exiting.");
            }
            return Err(err);
        }
    };

    if !args.no_summary {
        println!();
        print_summary(&RunStats::from_report(&report));
    }

    if !args.no_charts {
        let sink = PngChartSink::new(&args.charts_path, &target);
        let title = args
            .chart_title
            .clone()
            .unwrap_or_else(|| default_chart_title(&target));
        render_chart(&sink, &report, &title).await;
    }

    Ok(())
}

async fn execute(
    target: &Target,
    args: &ProbeArgs,
    events: Arc<dyn EventSink>,
) -> AppResult<RunReport> {
    let executor = HttpProbeExecutor::new(events.clone())?;
    let scheduler = ProbeScheduler::new(Arc::new(SystemResolver), Arc::new(executor), events)
        .with_observer(Arc::new(ConsoleObserver));

    info!(
        "Probing {} with {} request(s), at most {} in flight",
        target,
        args.requests.get(),
        args.max_jobs.get()
    );
    let report = scheduler.run(target, args.requests, args.max_jobs).await?;
    Ok(report)
}

/// Chart failures are reported but do not fail a completed run.
async fn render_chart(sink: &dyn ChartSink, report: &RunReport, title: &str) {
    let summary = summarize(report);
    match sink.render(&summary.ordered_latencies, title).await {
        Ok(Some(path)) => println!("Chart saved to {}", path.display()),
        Ok(None) => info!("No successful probes; chart skipped"),
        Err(err) => error!("Failed to render chart: {}", err),
    }
}
