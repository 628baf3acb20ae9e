//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
mod parsers;
mod types;

#[cfg(test)]
mod test_support;

pub use cli::ProbeArgs;
pub use types::{PositiveU64, PositiveUsize};

pub(crate) use defaults::DEFAULT_USER_AGENT;
#[cfg(test)]
pub(crate) use defaults::{DEFAULT_LOG_FILE, default_charts_path};
