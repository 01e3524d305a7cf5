//! Host address lookup for profile annotations.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;

/// Resolves a host to the address shown next to it in a profile.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// First address for `host`, or `None` if it does not resolve.
    async fn resolve(&self, host: &str) -> Option<IpAddr>;
}

/// DNS-backed resolver.
#[derive(Clone)]
pub struct DnsHostResolver {
    resolver: Arc<TokioAsyncResolver>,
}

impl DnsHostResolver {
    pub fn new(resolver: Arc<TokioAsyncResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl HostResolver for DnsHostResolver {
    async fn resolve(&self, host: &str) -> Option<IpAddr> {
        match self.resolver.lookup_ip(host).await {
            Ok(response) => response.iter().next(),
            Err(e) => {
                log::debug!("Could not resolve {}: {}", host, e);
                None
            }
        }
    }
}
