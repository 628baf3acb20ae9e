use url::{Host, Url};

use crate::error::{ResolveError, ValidationError};

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";
const DEFAULT_HTTP_PORT: u16 = 80;

/// Prefixes `http://` unless the value already carries an HTTP(S) scheme.
#[must_use]
pub fn ensure_scheme(value: &str) -> String {
    if value.starts_with(HTTP_PREFIX) || value.starts_with(HTTPS_PREFIX) {
        value.to_owned()
    } else {
        format!("{}{}", HTTP_PREFIX, value)
    }
}

/// The host under test, as given by the caller plus its normalized URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    raw: String,
    url: String,
}

impl Target {
    /// Builds a target from a bare hostname or URL.
    ///
    /// # Errors
    ///
    /// Returns `EmptyTarget` when the value is blank.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTarget);
        }
        Ok(Self {
            raw: trimmed.to_owned(),
            url: ensure_scheme(trimmed),
        })
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Host and port the target URL points at, suitable for a name lookup.
    ///
    /// # Errors
    ///
    /// Returns an error when the normalized URL cannot be parsed or has no host.
    pub fn host_port(&self) -> Result<(String, u16), ResolveError> {
        let parsed = Url::parse(&self.url).map_err(|source| ResolveError::InvalidTarget {
            target: self.raw.clone(),
            source,
        })?;
        let host = match parsed.host() {
            Some(Host::Domain(domain)) => domain.to_owned(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            None => {
                return Err(ResolveError::MissingHost {
                    target: self.raw.clone(),
                });
            }
        };
        let port = parsed.port_or_known_default().unwrap_or(DEFAULT_HTTP_PORT);
        Ok((host, port))
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
