use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, Timelike};

use crate::domain::Target;

/// `<charts_path>/run-<YYYY-MM-DD_HH-MM-SS>_<host>-<port>`
#[must_use]
pub fn resolve_chart_output_dir(charts_path: &str, target: &Target) -> PathBuf {
    Path::new(charts_path).join(chart_run_dir_name(target))
}

fn chart_run_dir_name(target: &Target) -> String {
    let now = Local::now();
    let stamp = format!(
        "{:04}-{:02}-{:02}_{:02}-{:02}-{:02}",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    );
    format!("run-{}_{}", stamp, target_host_port_segment(target))
}

fn target_host_port_segment(target: &Target) -> String {
    target.host_port().map_or_else(
        |_| "unknown-host-0".to_owned(),
        |(host, port)| sanitize_host_port(&host, port),
    )
}

fn sanitize_segment(input: &str) -> String {
    input
        .chars()
        .map(|ch| match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => ch,
            _ => '-',
        })
        .collect()
}

fn sanitize_host_port(host: &str, port: u16) -> String {
    let sanitized_host = sanitize_segment(host);
    let resolved_host = if sanitized_host.is_empty() {
        "unknown-host".to_owned()
    } else {
        sanitized_host
    };
    format!("{}-{}", resolved_host, port)
}
