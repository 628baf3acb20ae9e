//! Value types shared by the resolver, the probe pipeline and the reports.
pub mod probe;
pub mod run;
pub mod target;

pub use probe::{ProbeOutcome, ProbeRequest, ProbeResult, format_millis};
pub use run::{RunReport, RunReportBuilder};
pub use target::{Target, ensure_scheme};
