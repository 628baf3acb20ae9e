use std::str::FromStr;

use crate::error::{AppError, AppResult, ValidationError};

/// clap value parser for the positive-integer newtypes.
pub(super) fn parse_positive<T>(s: &str) -> AppResult<T>
where
    T: FromStr<Err = ValidationError>,
{
    s.parse::<T>().map_err(AppError::from)
}

/// Accepts the usual spellings of a boolean environment flag such as `NO_COLOR`.
pub(super) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}
