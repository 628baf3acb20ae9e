use std::path::Path;
use std::time::Duration;

use plotters::prelude::*;

use crate::domain::format_millis;
use crate::error::AppResult;

const CHART_SIZE: (u32, u32) = (1600, 600);
/// Tenths of the peak added above it.
const Y_HEADROOM_DIVISOR: u64 = 10;
const MARKER_RADIUS: u32 = 4;

/// Line plot of latency against 1-based request number, with point markers.
/// The y axis is in microseconds and labelled in milliseconds.
///
/// # Errors
///
/// Returns an error when the bitmap cannot be drawn or written.
pub fn plot_response_times(latencies: &[Duration], title: &str, path: &Path) -> AppResult<()> {
    if latencies.is_empty() {
        return Ok(());
    }

    let points: Vec<(u64, u64)> = (1_u64..)
        .zip(latencies.iter().map(|latency| micros(*latency)))
        .collect();
    let x_max = u64::try_from(latencies.len())
        .unwrap_or(u64::MAX)
        .saturating_add(1);
    let y_peak = points.iter().map(|&(_, y)| y).max().unwrap_or(0);
    let y_max = y_peak
        .saturating_add(y_peak / Y_HEADROOM_DIVISOR)
        .max(1);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(1_u64..x_max, 0_u64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Request Number")
        .y_desc("Response Time (ms)")
        .y_label_formatter(&|value| format_millis(Duration::from_micros(*value)))
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
    chart.draw_series(
        points
            .iter()
            .map(|&point| Circle::new(point, MARKER_RADIUS, BLUE.filled())),
    )?;

    root.present()?;
    Ok(())
}

fn micros(latency: Duration) -> u64 {
    u64::try_from(latency.as_micros()).unwrap_or(u64::MAX)
}
