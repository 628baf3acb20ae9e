use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use tokio::time::Instant;
use tracing::debug;

use crate::args::DEFAULT_USER_AGENT;
use crate::domain::{ProbeOutcome, ProbeRequest, ProbeResult};
use crate::error::{AppError, AppResult, HttpError};
use crate::sinks::{EventSink, LogEvent};

/// Network timeout applied to every probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait ProbeExecutor: Send + Sync {
    /// Runs one probe to completion. Never fails: transport problems are
    /// reported as [`ProbeOutcome::Failure`].
    async fn probe(&self, request: ProbeRequest) -> ProbeResult;
}

/// Issues a single timed GET per probe and logs the outcome.
#[derive(Clone)]
pub struct HttpProbeExecutor {
    client: Client,
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for HttpProbeExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProbeExecutor")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl HttpProbeExecutor {
    /// Builds an executor using [`PROBE_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(events: Arc<dyn EventSink>) -> AppResult<Self> {
        Self::with_timeout(events, PROBE_TIMEOUT)
    }

    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn with_timeout(events: Arc<dyn EventSink>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))?;
        Ok(Self { client, events })
    }

    async fn fetch(&self, url: &str) -> Result<StatusCode, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        drain_response_body(response).await?;
        Ok(status)
    }
}

#[async_trait]
impl ProbeExecutor for HttpProbeExecutor {
    async fn probe(&self, request: ProbeRequest) -> ProbeResult {
        let started_at = Local::now();
        let start = Instant::now();
        let outcome = match self.fetch(request.target.url()).await {
            Ok(status) => ProbeOutcome::Success {
                status_code: status.as_u16(),
                reason_phrase: status.canonical_reason().unwrap_or_default().to_owned(),
                latency: start.elapsed(),
                timestamp: started_at,
            },
            Err(err) => {
                debug!("Request #{} failed: {}", request.sequence, err);
                ProbeOutcome::Failure {
                    error: describe_error(&err),
                    timestamp: Local::now(),
                }
            }
        };
        let result = ProbeResult::new(request, outcome);
        self.events.record(LogEvent::probe(&result));
        result
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}

/// Error text including the source chain; reqwest's top-level message alone
/// rarely names the cause.
fn describe_error(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    if text.is_empty() {
        text.push_str("request failed");
    }
    text
}
