use std::time::Duration;

use tempfile::tempdir;

use super::{ChartSink, PngChartSink, default_chart_title, plot_response_times};
use crate::domain::Target;
use crate::error::{AppError, AppResult};

#[tokio::test(flavor = "current_thread")]
async fn empty_series_renders_nothing() -> AppResult<()> {
    let dir = tempdir()?;
    let charts_path = dir.path().to_string_lossy().into_owned();
    let target = Target::new("example.test")?;
    let sink = PngChartSink::new(&charts_path, &target);

    let rendered = sink.render(&[], "Empty").await?;
    if rendered.is_some() {
        return Err(AppError::sink("Expected no chart for empty series"));
    }
    if sink.output_dir().exists() {
        return Err(AppError::sink("Expected no run directory for empty series"));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn renders_png_into_run_directory() -> AppResult<()> {
    let dir = tempdir()?;
    let charts_path = dir.path().to_string_lossy().into_owned();
    let target = Target::new("example.test:8080")?;
    let sink = PngChartSink::new(&charts_path, &target);

    let rendered = sink
        .render(
            &[
                Duration::from_micros(12_500),
                Duration::from_millis(30),
                Duration::from_micros(8_250),
                Duration::from_millis(14),
            ],
            &default_chart_title(&target),
        )
        .await?;
    let Some(path) = rendered else {
        return Err(AppError::sink("Expected a chart path"));
    };
    if !path.starts_with(dir.path()) || !path.exists() {
        return Err(AppError::sink(format!(
            "Chart missing at {}",
            path.display()
        )));
    }
    let metadata = std::fs::metadata(&path)?;
    if metadata.len() == 0 {
        return Err(AppError::sink("Chart file is empty"));
    }
    Ok(())
}

#[test]
fn single_point_and_flat_series_plot() -> AppResult<()> {
    let dir = tempdir()?;
    let single = dir.path().join("single.png");
    plot_response_times(&[Duration::from_millis(42)], "Single", &single)?;
    let flat = dir.path().join("flat.png");
    plot_response_times(&[Duration::ZERO; 3], "Flat", &flat)?;
    if !single.exists() || !flat.exists() {
        return Err(AppError::sink("Expected both charts to be written"));
    }
    Ok(())
}

#[test]
fn default_title_names_the_target() -> AppResult<()> {
    let target = Target::new("example.test")?;
    if default_chart_title(&target) != "Response Times for example.test" {
        return Err(AppError::sink("Unexpected default title"));
    }
    Ok(())
}
