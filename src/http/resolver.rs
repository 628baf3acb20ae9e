use std::collections::HashSet;
use std::net::IpAddr;

use async_trait::async_trait;
use tokio::net::lookup_host;
use tracing::debug;

use crate::domain::Target;
use crate::error::ResolveError;

#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolves the target's host to an ordered, deduplicated, non-empty list.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] when the host cannot be resolved.
    async fn resolve(&self, target: &Target) -> Result<Vec<IpAddr>, ResolveError>;
}

/// Resolver backed by the operating system's name lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

#[async_trait]
impl AddressResolver for SystemResolver {
    async fn resolve(&self, target: &Target) -> Result<Vec<IpAddr>, ResolveError> {
        let (host, port) = target.host_port()?;
        let addrs = lookup_host((host.as_str(), port))
            .await
            .map_err(|source| ResolveError::Lookup {
                host: host.clone(),
                source,
            })?;
        let ips = dedup_preserving_order(addrs.map(|addr| addr.ip()));
        if ips.is_empty() {
            return Err(ResolveError::NoAddresses { host });
        }
        debug!("Resolved {} to {} address(es)", host, ips.len());
        Ok(ips)
    }
}

pub(super) fn dedup_preserving_order<I>(ips: I) -> Vec<IpAddr>
where
    I: IntoIterator<Item = IpAddr>,
{
    let mut seen = HashSet::new();
    ips.into_iter().filter(|ip| seen.insert(*ip)).collect()
}
