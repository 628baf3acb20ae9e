use serde::Deserialize;

/// On-disk configuration. Every field mirrors a CLI flag of the same name.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub requests: Option<u64>,
    pub max_jobs: Option<usize>,
    pub log_file: Option<String>,
    pub charts_path: Option<String>,
    pub no_charts: Option<bool>,
    pub chart_title: Option<String>,
    pub no_summary: Option<bool>,
}
