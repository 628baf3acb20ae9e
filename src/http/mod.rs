//! Address resolution, probe execution and the bounded probe scheduler.
mod executor;
mod resolver;
mod scheduler;

#[cfg(test)]
mod tests;

pub use executor::{HttpProbeExecutor, PROBE_TIMEOUT, ProbeExecutor};
pub use resolver::{AddressResolver, SystemResolver};
pub use scheduler::{ProbeScheduler, assign_address};
