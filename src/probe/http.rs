//! Network implementation of [`Fetcher`].

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use url::Url;

use super::title::{extract_title, join_lines};
use super::{Fetcher, ProbeResult};
use crate::config::{Timeouts, TITLE_NOT_FOUND};
use crate::error_handling::{categorize_transport_error, InitializationError, TransportError};
use crate::initialization::init_client;

/// Fetcher backed by a shared `reqwest::Client`.
///
/// The client carries the connect/read timeouts and the no-cache headers, and
/// follows redirects. Pages and embedded resources go through the same
/// connection-opening path.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeouts: Timeouts) -> Result<Self, InitializationError> {
        Ok(Self {
            client: init_client(timeouts)?,
        })
    }

    async fn open(&self, url: &str, user_agent: &str) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str, user_agent: &str) -> ProbeResult {
        let probed_at = Utc::now();

        let response = match self.open(url, user_agent).await {
            Ok(response) => response,
            Err(e) => {
                let error = categorize_transport_error(&e);
                log::debug!("Probe of {} failed: {}", url, error);
                return ProbeResult::transport_failure(&error, user_agent, probed_at);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            return ProbeResult::status(i32::from(status.as_u16()), user_agent, probed_at);
        }

        match response.text().await {
            Ok(raw) => {
                let body = join_lines(&raw);
                let title = extract_title(&body).unwrap_or(TITLE_NOT_FOUND).to_string();
                ProbeResult::page(title, body, user_agent, probed_at)
            }
            Err(e) => {
                let error = categorize_transport_error(&e);
                log::debug!("Reading body of {} failed: {}", url, error);
                ProbeResult::transport_failure(&error, user_agent, probed_at)
            }
        }
    }

    async fn content_length(
        &self,
        url: &Url,
        user_agent: &str,
    ) -> Result<Option<u64>, TransportError> {
        let response = self
            .open(url.as_str(), user_agent)
            .await
            .map_err(|e| categorize_transport_error(&e))?;
        // Dropping the response closes it without reading the body
        Ok(response.content_length())
    }
}
