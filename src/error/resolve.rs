use thiserror::Error;

/// Fatal to a run: no probe is dispatched once resolution fails.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid target '{target}': {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Target '{target}' has no host.")]
    MissingHost { target: String },
    #[error("Lookup of {host} failed: {source}")]
    Lookup {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("No addresses resolved for {host}.")]
    NoAddresses { host: String },
}
