use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveU64, PositiveUsize, ProbeArgs};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments. Flags given on the command
/// line win over the file.
///
/// # Errors
///
/// Returns an error when a count in the config is zero.
pub fn apply_config(
    args: &mut ProbeArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "requests")
        && let Some(requests) = config.requests
    {
        args.requests = ensure_positive_u64(requests, "requests")?;
    }

    if !is_cli(matches, "max_jobs")
        && let Some(max_jobs) = config.max_jobs
    {
        args.max_jobs = ensure_positive_usize(max_jobs, "max_jobs")?;
    }

    if !is_cli(matches, "log_file")
        && let Some(log_file) = config.log_file.clone()
    {
        args.log_file = log_file;
    }

    if !is_cli(matches, "charts_path")
        && let Some(charts_path) = config.charts_path.clone()
    {
        args.charts_path = charts_path;
    }

    if !is_cli(matches, "no_charts")
        && let Some(no_charts) = config.no_charts
    {
        args.no_charts = no_charts;
    }

    if !is_cli(matches, "chart_title")
        && let Some(title) = config.chart_title.clone()
    {
        args.chart_title = Some(title);
    }

    if !is_cli(matches, "no_summary")
        && let Some(no_summary) = config.no_summary
    {
        args.no_summary = no_summary;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &'static str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive { field, source: err })
    })
}

fn ensure_positive_usize(value: usize, field: &'static str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive { field, source: err })
    })
}
