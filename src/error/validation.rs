use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid boolean '{value}'. Expected true/false.")]
    InvalidBoolean { value: String },
    #[error("Missing URL (set --url or provide in config).")]
    MissingUrl,
    #[error("Target must not be empty.")]
    EmptyTarget,
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
