mod latency;
mod naming;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tracing::{error, info};

use crate::domain::Target;
use crate::error::{AppError, AppResult, SinkError};

pub use latency::plot_response_times;
pub use naming::resolve_chart_output_dir;

const RESPONSE_TIMES_FILE: &str = "response_times.png";

/// Consumes the ordered latency series of a run.
#[async_trait]
pub trait ChartSink: Send + Sync {
    /// Renders `latencies` (ascending by request number). Returns where the
    /// chart was written, or `None` when nothing was drawn.
    async fn render(&self, latencies: &[Duration], title: &str) -> AppResult<Option<PathBuf>>;
}

/// Writes PNG charts into a fresh per-run directory under the charts path.
#[derive(Debug, Clone)]
pub struct PngChartSink {
    output_dir: PathBuf,
}

impl PngChartSink {
    #[must_use]
    pub fn new(charts_path: &str, target: &Target) -> Self {
        Self {
            output_dir: resolve_chart_output_dir(charts_path, target),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl ChartSink for PngChartSink {
    async fn render(&self, latencies: &[Duration], title: &str) -> AppResult<Option<PathBuf>> {
        if latencies.is_empty() {
            info!("No successful responses; skipping chart");
            return Ok(None);
        }

        if let Err(err) = fs::create_dir_all(&self.output_dir).await {
            error!(
                "Failed to create output directory '{}': {}",
                self.output_dir.display(),
                err
            );
            return Err(AppError::sink(SinkError::CreateChartDir {
                path: self.output_dir.clone(),
                source: err,
            }));
        }

        let path = self.output_dir.join(RESPONSE_TIMES_FILE);
        info!("Plotting response times...");
        plot_response_times(latencies, title, &path)?;
        Ok(Some(path))
    }
}

/// Default chart caption for a target.
#[must_use]
pub fn default_chart_title(target: &Target) -> String {
    format!("Response Times for {}", target)
}
