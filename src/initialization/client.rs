//! HTTP client initialization.

use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::ClientBuilder;

use crate::config::Timeouts;
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used for probes and resource fetches.
///
/// Creates a `reqwest::Client` configured with:
/// - Connect and read timeouts from `timeouts`
/// - Redirect following (reqwest default policy, up to 10 hops)
/// - `Cache-Control: no-cache` and `Pragma: no-cache` on every request
///
/// No default User-Agent is set; every request supplies its own.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(timeouts: Timeouts) -> Result<reqwest::Client, InitializationError> {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

    let client = ClientBuilder::new()
        .connect_timeout(timeouts.connect)
        .read_timeout(timeouts.read)
        .default_headers(headers)
        .build()?;
    Ok(client)
}
