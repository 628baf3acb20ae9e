use plotters::prelude::{BitMapBackend, DrawingAreaErrorKind, DrawingBackend};
use thiserror::Error;

use super::{ConfigError, HttpError, ResolveError, SinkError, ValidationError};

type PlottersError = DrawingAreaErrorKind<<BitMapBackend<'static> as DrawingBackend>::ErrorType>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("Join error: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
    #[error("Plotting error: {source}")]
    Plotters {
        #[from]
        source: PlottersError,
    },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation<E>(error: E) -> Self
    where
        E: Into<ValidationError>,
    {
        error.into().into()
    }

    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    pub fn http<E>(error: E) -> Self
    where
        E: Into<HttpError>,
    {
        error.into().into()
    }

    pub fn sink<E>(error: E) -> Self
    where
        E: Into<SinkError>,
    {
        error.into().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(host: &str) -> Result<(), ResolveError> {
        Err(ResolveError::NoAddresses {
            host: host.to_owned(),
        })
    }

    fn run(host: &str) -> AppResult<()> {
        lookup(host)?;
        Ok(())
    }

    #[test]
    fn resolution_errors_surface_as_resolve() -> Result<(), String> {
        let Err(err) = run("missing.test") else {
            return Err("Expected an error".to_owned());
        };
        if !matches!(&err, AppError::Resolve(ResolveError::NoAddresses { host }) if host == "missing.test")
        {
            return Err(format!("Unexpected error {:?}", err));
        }
        if !err.to_string().starts_with("Resolution error: ") {
            return Err(format!("Unexpected message {}", err));
        }
        Ok(())
    }
}
