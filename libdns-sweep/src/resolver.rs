use async_trait::async_trait;
use std::{io, net::IpAddr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no addresses for {0}")]
    NotFound(String),
    #[error("lookup of {host} failed: {source}")]
    Failed {
        host: String,
        #[source]
        source: io::Error,
    },
}

/// Host-to-address lookup used by the probe workers.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError>;
}

/// The operating system resolver (getaddrinfo), run on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl Resolver for SystemResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|source| ResolveError::Failed {
                host: host.to_string(),
                source,
            })?
            .map(|addr| addr.ip())
            .collect();

        if addrs.is_empty() {
            return Err(ResolveError::NotFound(host.to_string()));
        }
        Ok(addrs)
    }
}
