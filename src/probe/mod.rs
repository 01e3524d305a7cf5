//! Probe executor.
//!
//! One probe is one GET against a tracked URL with a rotated user agent. The
//! outcome is always a [`ProbeResult`] value: HTTP errors, timeouts and
//! connection failures are folded into the result code and title instead of
//! being returned as errors.

mod context;
mod http;
mod title;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use url::Url;

use crate::config::{HTTP_OK, TRANSPORT_FAILURE_CODE};
use crate::error_handling::{TransportError, TransportFailure};

pub use context::ProbeContext;
pub use http::HttpFetcher;
pub use title::{extract_title, join_lines};

/// Outcome of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// HTTP status, or `-1` when no response was received
    pub code: i32,
    /// Page title on 200, diagnostic text on transport failure, empty otherwise
    pub title: String,
    /// Page body on 200, empty otherwise
    pub body: String,
    /// Identity used for the request; profile fetches reuse it
    pub user_agent: String,
    /// When the probe was issued
    pub probed_at: DateTime<Utc>,
    /// Set when the probe failed below HTTP
    pub failure: Option<TransportFailure>,
}

impl ProbeResult {
    /// A 200 response with its captured page.
    pub fn page(
        title: impl Into<String>,
        body: impl Into<String>,
        user_agent: impl Into<String>,
        probed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code: HTTP_OK,
            title: title.into(),
            body: body.into(),
            user_agent: user_agent.into(),
            probed_at,
            failure: None,
        }
    }

    /// A response with a non-200 status; nothing is captured.
    pub fn status(code: i32, user_agent: impl Into<String>, probed_at: DateTime<Utc>) -> Self {
        Self {
            code,
            title: String::new(),
            body: String::new(),
            user_agent: user_agent.into(),
            probed_at,
            failure: None,
        }
    }

    /// A probe that never got an HTTP status.
    pub fn transport_failure(
        error: &TransportError,
        user_agent: impl Into<String>,
        probed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code: TRANSPORT_FAILURE_CODE,
            title: error.to_string(),
            body: String::new(),
            user_agent: user_agent.into(),
            probed_at,
            failure: Some(error.kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == HTTP_OK
    }
}

/// Outbound HTTP used by probes and content profiling.
///
/// `HttpFetcher` is the network implementation; tests substitute canned
/// responses.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a tracked page with the given identity. Never fails.
    async fn fetch_page(&self, url: &str, user_agent: &str) -> ProbeResult;

    /// Issues a GET for an embedded resource and reports its declared length.
    ///
    /// `Ok(None)` means the response carried no usable length. The body is not
    /// read.
    async fn content_length(&self, url: &Url, user_agent: &str)
        -> Result<Option<u64>, TransportError>;
}

/// Probes `url` with a user agent drawn from the rotation pool.
pub async fn probe<F: Fetcher + ?Sized>(fetcher: &F, url: &str) -> ProbeResult {
    let user_agent = crate::user_agent::random_user_agent();
    log::debug!("Connecting to {} with User-Agent: {}", url, user_agent);
    let result = fetcher.fetch_page(url, user_agent).await;
    log::debug!("{} {}", url, result.code);
    result
}
