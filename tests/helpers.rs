// Shared test helpers for building services against a temporary database.

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use phish_track::{init_services_with, Config, HostResolver, HttpFetcher, Services, Timeouts};

/// Resolver that never resolves, so tests stay off the network.
pub struct NoDns;

#[async_trait]
impl HostResolver for NoDns {
    async fn resolve(&self, _host: &str) -> Option<IpAddr> {
        None
    }
}

/// Config with short timeouts and a small lock wait.
#[allow(dead_code)] // Used by other test files
pub fn test_config(db_path: &Path, max_stop_signals: u32) -> Config {
    Config {
        db_path: db_path.to_path_buf(),
        max_stop_signals,
        lock_wait: Duration::from_millis(100),
        timeouts: Timeouts::from_millis(1_000, 300),
        ..Default::default()
    }
}

/// Services with real HTTP and no DNS.
#[allow(dead_code)] // Used by other test files
pub async fn http_services(db_path: &Path, max_stop_signals: u32) -> Services {
    services_with(test_config(db_path, max_stop_signals)).await
}

/// Services for `config` with real HTTP and no DNS.
///
/// Each call opens its own pool, like a separate process would.
#[allow(dead_code)] // Used by other test files
pub async fn services_with(config: Config) -> Services {
    let fetcher = HttpFetcher::new(config.timeouts).expect("Failed to build HTTP fetcher");
    init_services_with(config, Arc::new(fetcher), Arc::new(NoDns))
        .await
        .expect("Failed to initialize services")
}
