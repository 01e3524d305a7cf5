//! Content distribution profiles.
//!
//! A profile answers "who serves this phishing page?": for every host the
//! captured page pulls content from, how many links point at it and how many
//! bytes sit behind those links. The page itself is always attributed to its
//! own host, anchors are counted in one shared bucket without being followed,
//! and every other absolute link is fetched once to read its declared size.

mod resolve;
mod scan;

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::HYPERLINK_BUCKET;
use crate::error_handling::ProfileError;
use crate::probe::Fetcher;

pub use resolve::{DnsHostResolver, HostResolver};
pub use scan::{scan_links, LinkKind, TagLink};

/// Address annotation shown next to a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostAddress {
    Resolved(IpAddr),
    Unknown,
    /// Synthetic buckets have no address
    NotApplicable,
}

/// Running totals for one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTotals {
    pub bytes: u64,
    pub links: u64,
    pub address: HostAddress,
}

/// One row of a rendered profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry<'a> {
    pub host: &'a str,
    pub label: String,
    pub bytes: u64,
    pub links: u64,
}

/// Per-host byte and link distribution of one captured page.
///
/// The page itself is not kept; callers pass it to [`ContentProfile::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentProfile {
    totals: BTreeMap<String, HostTotals>,
    valid: bool,
}

fn normalize_host(host: &str) -> String {
    host.trim().to_lowercase()
}

impl ContentProfile {
    /// A profile that has not been built yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Attributes `page` to the origin host and marks the profile valid.
    ///
    /// Any earlier tallies are discarded, so a retried build starts clean.
    pub async fn initialize<R>(
        &mut self,
        page: &str,
        origin_url: &str,
        resolver: &R,
    ) -> Result<(), ProfileError>
    where
        R: HostResolver + ?Sized,
    {
        let origin =
            Url::parse(origin_url).map_err(|_| ProfileError::InvalidOrigin(origin_url.to_string()))?;
        let host = origin
            .host_str()
            .ok_or_else(|| ProfileError::InvalidOrigin(origin_url.to_string()))?;
        let address = annotate(resolver, host).await;

        self.totals.clear();
        self.tally(host, page.len() as u64, address);
        self.valid = true;
        Ok(())
    }

    /// Initializes the profile, then scans `page` and tallies every link.
    ///
    /// Anchors go to the hyperlink bucket with zero bytes. Embedded resources are
    /// fetched with `user_agent` and tallied under their host when the response
    /// declares a length; resources without a length, with malformed URLs or
    /// whose fetch fails are logged and skipped. A host's address is looked up
    /// once, when its bucket is created. Only a bad origin URL fails the build,
    /// in which case the profile stays invalid and can be retried.
    pub async fn build<F, R>(
        &mut self,
        page: &str,
        user_agent: &str,
        origin_url: &str,
        fetcher: &F,
        resolver: &R,
    ) -> Result<(), ProfileError>
    where
        F: Fetcher + ?Sized,
        R: HostResolver + ?Sized,
    {
        self.initialize(page, origin_url, resolver).await?;
        log::debug!("Building content profile for {}", origin_url);

        for link in scan_links(page) {
            if link.kind == LinkKind::Anchor {
                self.tally(HYPERLINK_BUCKET, 0, HostAddress::NotApplicable);
                continue;
            }

            let url = match Url::parse(&link.url) {
                Ok(url) => url,
                Err(e) => {
                    log::warn!("Skipping malformed resource URL {}: {}", link.url, e);
                    continue;
                }
            };
            let Some(host) = url.host_str() else {
                log::warn!("Skipping resource URL without host: {}", link.url);
                continue;
            };

            match fetcher.content_length(&url, user_agent).await {
                Ok(Some(length)) => {
                    let address = match self.totals.get(&normalize_host(host)) {
                        Some(existing) => existing.address,
                        None => annotate(resolver, host).await,
                    };
                    self.tally(host, length, address);
                }
                Ok(None) => {
                    log::debug!("No content length for {}, not tallied", url);
                }
                Err(e) => {
                    log::warn!("Resource fetch failed for {}: {}", url, e);
                }
            }
        }
        Ok(())
    }

    /// Adds one link and `bytes` to `host`'s bucket, creating it if needed.
    ///
    /// Hosts are merged on their trimmed, lower-cased form; the first address
    /// seen for a host is kept.
    pub(crate) fn tally(&mut self, host: &str, bytes: u64, address: HostAddress) {
        log::trace!("Tallying {} {}", host, bytes);
        let entry = self
            .totals
            .entry(normalize_host(host))
            .or_insert(HostTotals {
                bytes: 0,
                links: 0,
                address,
            });
        entry.bytes += bytes;
        entry.links += 1;
    }

    fn ensure_valid(&self) -> Result<(), ProfileError> {
        if self.valid {
            Ok(())
        } else {
            Err(ProfileError::InvalidProfile)
        }
    }

    /// Bytes attributed to `host`; zero for hosts the page never referenced.
    pub fn bytes_for(&self, host: &str) -> Result<u64, ProfileError> {
        self.ensure_valid()?;
        Ok(self
            .totals
            .get(&normalize_host(host))
            .map_or(0, |t| t.bytes))
    }

    /// Links attributed to `host`; zero for hosts the page never referenced.
    pub fn links_for(&self, host: &str) -> Result<u64, ProfileError> {
        self.ensure_valid()?;
        Ok(self
            .totals
            .get(&normalize_host(host))
            .map_or(0, |t| t.links))
    }

    pub fn total_bytes(&self) -> Result<u64, ProfileError> {
        self.ensure_valid()?;
        Ok(self.totals.values().map(|t| t.bytes).sum())
    }

    pub fn total_links(&self) -> Result<u64, ProfileError> {
        self.ensure_valid()?;
        Ok(self.totals.values().map(|t| t.links).sum())
    }

    /// Normalized host keys, sorted.
    pub fn hosts(&self) -> Result<Vec<&str>, ProfileError> {
        self.ensure_valid()?;
        Ok(self.totals.keys().map(String::as_str).collect())
    }

    /// Rows for display, with each host annotated by its address.
    pub fn entries(&self) -> Result<Vec<HostEntry<'_>>, ProfileError> {
        self.ensure_valid()?;
        Ok(self
            .totals
            .iter()
            .map(|(host, totals)| HostEntry {
                host,
                label: match totals.address {
                    HostAddress::Resolved(ip) => format!("{} [{}]", host, ip),
                    HostAddress::Unknown => format!("{} [unknown IP]", host),
                    HostAddress::NotApplicable => host.clone(),
                },
                bytes: totals.bytes,
                links: totals.links,
            })
            .collect())
    }
}

async fn annotate<R: HostResolver + ?Sized>(resolver: &R, host: &str) -> HostAddress {
    match resolver.resolve(host).await {
        Some(ip) => HostAddress::Resolved(ip),
        None => HostAddress::Unknown,
    }
}

impl fmt::Display for ContentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(entries) = self.entries() else {
            return Ok(());
        };
        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "Host: {} Bytes: {} Links: {}",
                entry.label, entry.bytes, entry.links
            )?;
        }
        Ok(())
    }
}
