//! Plain-text site reports.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::profile::ContentProfile;
use crate::storage::Collection;
use crate::tracked::TrackedSite;
use crate::utils::{format_timestamp, hours_and_minutes};

use super::statistics::uptime_summary;

/// Reachability as shown to an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteState {
    /// Last probe qualified
    Up,
    /// Some stop signals, threshold not reached yet
    PossiblyDown {
        signals: u32,
        since: Option<DateTime<Utc>>,
    },
    Down,
}

impl SiteState {
    pub fn of(site: &TrackedSite) -> Self {
        let signals = site.stop_signals();
        if signals == 0 {
            SiteState::Up
        } else if signals < site.max_stop_signals() {
            SiteState::PossiblyDown {
                signals,
                since: site.first_stop_signal_time(),
            }
        } else {
            SiteState::Down
        }
    }
}

impl fmt::Display for SiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteState::Up => f.write_str("UP"),
            SiteState::PossiblyDown { signals, since } => {
                write!(f, "POSSIBLY DOWN ({})", signals)?;
                if let Some(since) = since {
                    write!(f, " since {}", format_timestamp(*since))?;
                }
                Ok(())
            }
            SiteState::Down => f.write_str("DOWN"),
        }
    }
}

/// Display of one site with its last `show_pings` pings and its profile.
pub struct SiteReport<'a> {
    pub site: &'a TrackedSite,
    pub show_pings: usize,
    pub now: DateTime<Utc>,
}

impl fmt::Display for SiteReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_site(f, self.site, self.show_pings, self.now)
    }
}

/// Display of every site in a collection, followed by uptime aggregates when
/// there is more than one site.
pub struct CollectionReport<'a> {
    pub sites: &'a [TrackedSite],
    pub collection: Collection,
    pub show_pings: usize,
    pub now: DateTime<Utc>,
}

impl fmt::Display for CollectionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sites = self.sites;
        writeln!(
            f,
            "{} {} site{}",
            sites.len(),
            self.collection.as_str(),
            if sites.len() == 1 { "" } else { "s" }
        )?;
        for site in sites {
            writeln!(f)?;
            write_site(f, site, self.show_pings, self.now)?;
        }

        if sites.len() > 1 {
            let summary = uptime_summary(sites, self.now);
            writeln!(f, "\nMean uptime: {}", hours_and_minutes(summary.mean_secs))?;
            writeln!(f, "Median uptime: {}", hours_and_minutes(summary.median_secs))?;
        }
        Ok(())
    }
}

/// Renders one site with its last `show_pings` pings and its profile.
pub fn render_site(site: &TrackedSite, show_pings: usize, now: DateTime<Utc>) -> String {
    SiteReport {
        site,
        show_pings,
        now,
    }
    .to_string()
}

/// Renders every site in `collection`; see [`CollectionReport`].
pub fn render_report(
    sites: &[TrackedSite],
    collection: Collection,
    show_pings: usize,
    now: DateTime<Utc>,
) -> String {
    CollectionReport {
        sites,
        collection,
        show_pings,
        now,
    }
    .to_string()
}

fn write_site<W: fmt::Write>(
    out: &mut W,
    site: &TrackedSite,
    show_pings: usize,
    now: DateTime<Utc>,
) -> fmt::Result {
    writeln!(out, "{} [{}]", site.url(), site.unique_id())?;
    if !site.label().is_empty() {
        writeln!(out, "  {}", site.label())?;
    }
    writeln!(
        out,
        "  Status: {}; site is {}",
        if site.is_running() {
            "actively monitoring"
        } else {
            "stopped monitoring"
        },
        SiteState::of(site)
    )?;
    writeln!(out, "  First contact: {}", format_timestamp(site.start_time()))?;
    if let Some(stopped) = site.stop_time() {
        writeln!(out, "  Confirmed offline at: {}", format_timestamp(stopped))?;
    }
    writeln!(
        out,
        "  Approximate uptime: {}",
        hours_and_minutes(site.duration_at(now).num_seconds())
    )?;
    writeln!(
        out,
        "  Pings: {} Stop signals: {}/{}",
        site.pings().len(),
        site.stop_signals(),
        site.max_stop_signals()
    )?;
    for ping in site.last_pings(show_pings) {
        writeln!(out, "    {}", ping)?;
    }
    if let Some(profile) = site.content_profile() {
        write_profile(out, profile)?;
    }
    Ok(())
}

/// Host table with each host's share of bytes and links.
fn write_profile<W: fmt::Write>(out: &mut W, profile: &ContentProfile) -> fmt::Result {
    let (Ok(entries), Ok(all_bytes), Ok(all_links)) =
        (profile.entries(), profile.total_bytes(), profile.total_links())
    else {
        return writeln!(out, "  Content profile: not built yet");
    };

    writeln!(out, "  Content profile:")?;
    for entry in entries {
        writeln!(
            out,
            "    {:<40} {:>10} ({:>5.1}%) {:>5} ({:>5.1}%)",
            entry.label,
            entry.bytes,
            percent(entry.bytes, all_bytes),
            entry.links,
            percent(entry.links, all_links)
        )?;
    }
    Ok(())
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}
