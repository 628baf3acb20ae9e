use std::fmt::Write as _;

use crate::error::{AppError, AppResult, SinkError};

use super::LogEvent;

const LINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

pub(super) fn write_event_line(output: &mut String, event: &LogEvent) -> AppResult<()> {
    writeln!(
        output,
        "{} {}",
        event.at.format(LINE_TIMESTAMP_FORMAT),
        event.message()
    )
    .map_err(|err| AppError::sink(SinkError::FormatLine { source: err }))
}
