use clap::Parser;

use super::defaults::{DEFAULT_LOG_FILE, default_charts_path};
use super::parsers::{parse_bool_env, parse_positive};
use super::types::{PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Measure HTTP response times of a host across its resolved IP addresses, with a bounded pool of concurrent probes, a per-request event log and a latency chart."
)]
pub struct ProbeArgs {
    /// Hostname or URL to probe (http:// is assumed when no scheme is given)
    #[arg(long, short)]
    pub url: Option<String>,

    /// Number of requests to send
    #[arg(
        long,
        short = 'n',
        default_value = "10",
        value_parser = parse_positive::<PositiveU64>
    )]
    pub requests: PositiveU64,

    /// Maximum number of requests in flight at once
    #[arg(
        long = "max-jobs",
        short = 'j',
        aliases = ["workers", "concurrency"],
        default_value = "3",
        value_parser = parse_positive::<PositiveUsize>
    )]
    pub max_jobs: PositiveUsize,

    /// File the per-request event log is appended to
    #[arg(long = "log-file", default_value = DEFAULT_LOG_FILE)]
    pub log_file: String,

    /// Path to save charts to
    #[arg(long = "charts-path", default_value_t = default_charts_path())]
    pub charts_path: String,

    /// Disable chart generation
    #[arg(long = "no-charts")]
    pub no_charts: bool,

    /// Chart title (defaults to "Response Times for <url>")
    #[arg(long = "chart-title")]
    pub chart_title: Option<String>,

    /// Skip the summary printed after the per-request lines
    #[arg(long = "no-summary")]
    pub no_summary: bool,

    /// Path to config file (TOML/JSON). Defaults to ./pingreport.toml or ./pingreport.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by PINGREPORT_LOG/RUST_LOG)
    #[arg(long, short = 'v', alias = "debug")]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
