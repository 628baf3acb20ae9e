use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to open event log '{path}': {source}")]
    OpenEventLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write event log '{path}': {source}")]
    WriteEventLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to format line: {source}")]
    FormatLine {
        #[source]
        source: std::fmt::Error,
    },
    #[error("Failed to create chart directory '{path}': {source}")]
    CreateChartDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
