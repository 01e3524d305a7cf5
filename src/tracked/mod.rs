//! Tracked sites and the up/down decision rule.
//!
//! A site is only declared down after `max_stop_signals` consecutive stop
//! signals, so a single timeout or a stale DNS answer does not end tracking.
//! A stop signal is any probe that is not a 200 carrying the title captured on
//! first contact. When the threshold is reached the stop time is backdated to
//! the first signal of the run, which is the best estimate of when the site
//! actually went away.

mod ping;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error_handling::{SurveyOutcome, TransportFailure};
use crate::probe::{ProbeContext, ProbeResult};
use crate::profile::ContentProfile;

pub use ping::{Ping, SiteStatus};

/// Durable record of one monitored URL and its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedSite {
    unique_id: String,
    label: String,
    url: String,
    start_time: DateTime<Utc>,
    status: SiteStatus,
    stop_time: Option<DateTime<Utc>>,
    initial_title: String,
    initial_page_content: String,
    pings: Vec<Ping>,
    stop_signals: u32,
    max_stop_signals: u32,
    first_stop_signal_time: Option<DateTime<Utc>>,
    content_profile: Option<ContentProfile>,
}

fn generate_unique_id() -> String {
    format!(
        "{}{:08x}",
        Utc::now().timestamp_millis(),
        rand::rng().random::<u32>()
    )
}

impl TrackedSite {
    /// A running site with no history.
    pub fn new(
        label: impl Into<String>,
        url: impl Into<String>,
        start_time: DateTime<Utc>,
        max_stop_signals: u32,
    ) -> Self {
        Self {
            unique_id: generate_unique_id(),
            label: label.into(),
            url: url.into(),
            start_time,
            status: SiteStatus::Running,
            stop_time: None,
            initial_title: String::new(),
            initial_page_content: String::new(),
            pings: Vec::new(),
            stop_signals: 0,
            max_stop_signals,
            first_stop_signal_time: None,
            content_profile: None,
        }
    }

    /// Applies one probe outcome to the record.
    ///
    /// Captures the first page and title, builds the content profile when one is
    /// pending, updates the stop-signal counter, appends the ping and stops the
    /// site once the counter reaches the threshold. Every change lands on
    /// `self` before returning; callers persist the record once afterwards.
    pub async fn record_ping(
        &mut self,
        result: &ProbeResult,
        origin_url: &str,
        ctx: &ProbeContext,
    ) -> SurveyOutcome {
        let mut outcome = self.classify(result);

        if result.is_success() {
            if self.initial_title.is_empty() {
                self.initial_title = result.title.clone();
            }
            if self.initial_page_content.is_empty() {
                self.initial_page_content = result.body.clone();
            }

            if self.content_profile.is_none() && !result.body.is_empty() {
                self.content_profile = Some(ContentProfile::new());
            }
            if let Some(profile) = self.content_profile.as_mut() {
                if !profile.is_valid() {
                    if let Err(e) = profile
                        .build(
                            &result.body,
                            &result.user_agent,
                            origin_url,
                            ctx.fetcher.as_ref(),
                            ctx.resolver.as_ref(),
                        )
                        .await
                    {
                        log::warn!("Content profile for {} not built: {}", self.unique_id, e);
                    } else {
                        ctx.events
                            .record(format!("Content profile built for {}", self.label));
                    }
                }
            }

            if result.title == self.initial_title {
                self.stop_signals = 0;
            } else {
                self.stop_signals += 1;
            }
        } else {
            self.stop_signals += 1;
        }

        if self.stop_signals == 1 {
            self.first_stop_signal_time = Some(result.probed_at);
        }

        self.pings.push(Ping::from(result));

        if self.status == SiteStatus::Running && self.stop_signals >= self.max_stop_signals {
            self.status = SiteStatus::Stopped;
            self.stop_time = self.first_stop_signal_time.or(Some(result.probed_at));
            ctx.events.record(format!(
                "{} declared down after {} stop signals",
                self.label, self.stop_signals
            ));
            outcome = SurveyOutcome::Stopped;
        }

        outcome
    }

    fn classify(&self, result: &ProbeResult) -> SurveyOutcome {
        match result.failure {
            Some(TransportFailure::Timeout) => SurveyOutcome::Timeout,
            Some(TransportFailure::Io) => SurveyOutcome::TransportError,
            None if !result.is_success() => SurveyOutcome::HttpError,
            None if self.initial_title.is_empty() || result.title == self.initial_title => {
                SurveyOutcome::Up
            }
            None => SurveyOutcome::TitleChanged,
        }
    }

    /// Resumes tracking: clears the counter and the stop time.
    pub fn start(&mut self) {
        self.status = SiteStatus::Running;
        self.stop_time = None;
        self.stop_signals = 0;
    }

    /// Stops tracking now.
    pub fn stop(&mut self) {
        self.status = SiteStatus::Stopped;
        self.stop_time = Some(Utc::now());
    }

    /// Drops the profile so the next successful capture builds a fresh one.
    pub fn clear_content_profile(&mut self) {
        self.content_profile = None;
    }

    /// Time tracked: start to stop if stopped, else start to now.
    pub fn duration(&self) -> Duration {
        self.duration_at(Utc::now())
    }

    pub(crate) fn duration_at(&self, now: DateTime<Utc>) -> Duration {
        self.stop_time.unwrap_or(now) - self.start_time
    }

    /// The last `n` pings, oldest first.
    pub fn last_pings(&self, n: usize) -> &[Ping] {
        &self.pings[self.pings.len().saturating_sub(n)..]
    }

    pub fn last_ping(&self) -> Option<&Ping> {
        self.pings.last()
    }

    pub fn pings(&self) -> &[Ping] {
        &self.pings
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn status(&self) -> SiteStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SiteStatus::Running
    }

    pub fn stop_time(&self) -> Option<DateTime<Utc>> {
        self.stop_time
    }

    pub fn initial_title(&self) -> &str {
        &self.initial_title
    }

    pub fn initial_page_content(&self) -> &str {
        &self.initial_page_content
    }

    pub fn stop_signals(&self) -> u32 {
        self.stop_signals
    }

    pub fn max_stop_signals(&self) -> u32 {
        self.max_stop_signals
    }

    pub fn first_stop_signal_time(&self) -> Option<DateTime<Utc>> {
        self.first_stop_signal_time
    }

    pub fn content_profile(&self) -> Option<&ContentProfile> {
        self.content_profile.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::TransportError;
    use crate::events::EventLog;
    use crate::probe::Fetcher;
    use crate::profile::HostResolver;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::net::IpAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use url::Url;

    /// Every resource is 10 bytes; counts how many were requested.
    #[derive(Default)]
    struct FixedLengthFetcher {
        requests: AtomicUsize,
    }

    #[async_trait]
    impl Fetcher for FixedLengthFetcher {
        async fn fetch_page(&self, _url: &str, user_agent: &str) -> ProbeResult {
            ProbeResult::status(500, user_agent, Utc::now())
        }

        async fn content_length(
            &self,
            _url: &Url,
            _user_agent: &str,
        ) -> Result<Option<u64>, TransportError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(Some(10))
        }
    }

    struct NoDns;

    #[async_trait]
    impl HostResolver for NoDns {
        async fn resolve(&self, _host: &str) -> Option<IpAddr> {
            None
        }
    }

    fn context() -> (ProbeContext, Arc<FixedLengthFetcher>) {
        let fetcher = Arc::new(FixedLengthFetcher::default());
        let ctx = ProbeContext::new(fetcher.clone(), Arc::new(NoDns), EventLog::new(10));
        (ctx, fetcher)
    }

    const ORIGIN: &str = "http://phish.test/login";

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2006, 8, 5, 18, minute, 0).unwrap()
    }

    fn site(threshold: u32) -> TrackedSite {
        TrackedSite::new("bank clone", ORIGIN, at(0), threshold)
    }

    fn success(title: &str, minute: u32) -> ProbeResult {
        ProbeResult::page(
            title,
            format!("<html><title>{}</title></html>", title),
            "ua",
            at(minute),
        )
    }

    fn timeout(minute: u32) -> ProbeResult {
        let err = TransportError::new(TransportFailure::Timeout, "Read timed out");
        ProbeResult::transport_failure(&err, "ua", at(minute))
    }

    #[tokio::test]
    async fn test_four_timeouts_stop_with_backdated_time() {
        let (ctx, _) = context();
        let mut site = site(4);

        for minute in 1..=3 {
            site.record_ping(&timeout(minute), ORIGIN, &ctx).await;
            assert!(site.is_running());
        }
        let outcome = site.record_ping(&timeout(4), ORIGIN, &ctx).await;

        assert_eq!(outcome, SurveyOutcome::Stopped);
        assert_eq!(site.status(), SiteStatus::Stopped);
        assert_eq!(site.stop_time(), Some(at(1)));
        assert_eq!(site.stop_signals(), 4);
        assert_eq!(site.pings().len(), 4);
        assert!(site.pings().iter().all(Ping::is_transport_failure));
    }

    #[tokio::test]
    async fn test_title_change_then_recovery_resets_counter() {
        let (ctx, _) = context();
        let mut site = site(4);
        let mut counters = Vec::new();

        site.record_ping(&success("Welcome", 1), ORIGIN, &ctx).await;
        counters.push(site.stop_signals());
        let changed = site
            .record_ping(&success("Service Unavailable", 2), ORIGIN, &ctx)
            .await;
        counters.push(site.stop_signals());
        site.record_ping(&success("Welcome", 3), ORIGIN, &ctx).await;
        counters.push(site.stop_signals());

        assert_eq!(counters, vec![0, 1, 0]);
        assert_eq!(changed, SurveyOutcome::TitleChanged);
        assert!(site.is_running());
        assert_eq!(site.initial_title(), "Welcome");
    }

    #[tokio::test]
    async fn test_counter_tracks_consecutive_non_qualifying_events() {
        #[derive(Clone, Copy)]
        enum Event {
            Same,
            Changed,
            Failed,
        }
        let (ctx, _) = context();
        let events = [
            Event::Same,
            Event::Failed,
            Event::Changed,
            Event::Failed,
            Event::Same,
            Event::Changed,
            Event::Same,
            Event::Failed,
        ];

        let mut site = site(100);
        let mut expected = 0;
        for (i, event) in events.iter().enumerate() {
            let minute = i as u32 + 1;
            let result = match event {
                Event::Same => success("Welcome", minute),
                Event::Changed => success("Gone", minute),
                Event::Failed => ProbeResult::status(404, "ua", at(minute)),
            };
            site.record_ping(&result, ORIGIN, &ctx).await;

            expected = match event {
                Event::Same => 0,
                _ => expected + 1,
            };
            assert_eq!(site.stop_signals(), expected, "after event {}", i);
        }
    }

    #[tokio::test]
    async fn test_first_stop_signal_time_marks_start_of_run() {
        let (ctx, _) = context();
        let mut site = site(10);

        site.record_ping(&timeout(1), ORIGIN, &ctx).await;
        assert_eq!(site.first_stop_signal_time(), Some(at(1)));
        // First capture sets the initial title, so this success qualifies
        site.record_ping(&success("Welcome", 2), ORIGIN, &ctx).await;
        assert_eq!(site.stop_signals(), 0);

        site.record_ping(&success("Welcome", 3), ORIGIN, &ctx).await;
        site.record_ping(&timeout(4), ORIGIN, &ctx).await;
        site.record_ping(&timeout(5), ORIGIN, &ctx).await;
        assert_eq!(site.first_stop_signal_time(), Some(at(4)));
    }

    #[tokio::test]
    async fn test_stop_happens_exactly_at_threshold() {
        let (ctx, _) = context();
        let mut site = site(3);
        site.record_ping(&success("Welcome", 1), ORIGIN, &ctx).await;

        site.record_ping(&ProbeResult::status(503, "ua", at(2)), ORIGIN, &ctx)
            .await;
        site.record_ping(&success("Suspended", 3), ORIGIN, &ctx).await;
        assert!(site.is_running());
        site.record_ping(&timeout(4), ORIGIN, &ctx).await;

        assert_eq!(site.status(), SiteStatus::Stopped);
        assert_eq!(site.stop_time(), Some(at(2)));
        assert_eq!(site.duration(), Duration::minutes(2));
    }

    #[tokio::test]
    async fn test_initial_capture_is_kept() {
        let (ctx, _) = context();
        let mut site = site(4);
        let first = success("Welcome", 1);

        site.record_ping(&first, ORIGIN, &ctx).await;
        site.record_ping(&success("Other", 2), ORIGIN, &ctx).await;

        assert_eq!(site.initial_title(), "Welcome");
        assert_eq!(site.initial_page_content(), first.body);
    }

    #[tokio::test]
    async fn test_profile_valid_after_first_capture_without_links() {
        let (ctx, fetcher) = context();
        let mut site = site(4);
        assert!(site.content_profile().is_none());

        site.record_ping(&success("Welcome", 1), ORIGIN, &ctx).await;

        let profile = site.content_profile().expect("profile");
        assert!(profile.is_valid());
        assert_eq!(profile.hosts().unwrap(), vec!["phish.test"]);
        assert_eq!(fetcher.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_page_is_stored_once() {
        let (ctx, _) = context();
        let mut site = site(4);
        let page = ProbeResult::page(
            "Welcome",
            "<title>Welcome</title><p>distinctive-body-text</p>",
            "ua",
            at(1),
        );

        site.record_ping(&page, ORIGIN, &ctx).await;
        assert!(site.content_profile().unwrap().is_valid());

        let json = serde_json::to_string(&site).expect("serialize");
        assert_eq!(json.matches("distinctive-body-text").count(), 1);
    }

    #[tokio::test]
    async fn test_profile_built_once_until_cleared() {
        let (ctx, fetcher) = context();
        let mut site = site(4);
        let page = |minute| {
            ProbeResult::page(
                "Welcome",
                r#"<title>Welcome</title><img src="http://cdn.test/logo.png">"#,
                "ua",
                at(minute),
            )
        };

        site.record_ping(&page(1), ORIGIN, &ctx).await;
        site.record_ping(&page(2), ORIGIN, &ctx).await;
        assert_eq!(fetcher.requests.load(Ordering::SeqCst), 1);
        assert_eq!(
            site.content_profile().unwrap().bytes_for("cdn.test"),
            Ok(10)
        );

        site.clear_content_profile();
        assert!(site.content_profile().is_none());
        site.record_ping(&page(3), ORIGIN, &ctx).await;
        assert_eq!(fetcher.requests.load(Ordering::SeqCst), 2);
        assert!(site.content_profile().unwrap().is_valid());
    }

    #[tokio::test]
    async fn test_failures_do_not_create_profile() {
        let (ctx, _) = context();
        let mut site = site(4);
        site.record_ping(&timeout(1), ORIGIN, &ctx).await;
        site.record_ping(&ProbeResult::status(404, "ua", at(2)), ORIGIN, &ctx)
            .await;
        assert!(site.content_profile().is_none());
        assert!(site.initial_title().is_empty());
    }

    #[tokio::test]
    async fn test_reactivation_resets_counter_and_stop_time() {
        let (ctx, _) = context();
        let mut site = site(2);
        site.record_ping(&timeout(1), ORIGIN, &ctx).await;
        site.record_ping(&timeout(2), ORIGIN, &ctx).await;
        assert_eq!(site.status(), SiteStatus::Stopped);

        site.start();
        assert!(site.is_running());
        assert_eq!(site.stop_signals(), 0);
        assert_eq!(site.stop_time(), None);

        // A fresh run is needed before the site stops again
        site.record_ping(&timeout(3), ORIGIN, &ctx).await;
        assert!(site.is_running());
    }

    #[test]
    fn test_manual_stop_sets_stop_time() {
        let mut site = site(4);
        site.stop();
        assert_eq!(site.status(), SiteStatus::Stopped);
        assert!(site.stop_time().is_some());
    }

    #[test]
    fn test_duration_while_running_uses_now() {
        let site = site(4);
        assert_eq!(site.duration_at(at(30)), Duration::minutes(30));
    }

    #[tokio::test]
    async fn test_last_pings_window() {
        let (ctx, _) = context();
        let mut site = site(100);
        assert!(site.last_ping().is_none());
        assert!(site.last_pings(5).is_empty());

        for minute in 1..=7 {
            site.record_ping(&timeout(minute), ORIGIN, &ctx).await;
        }
        let window = site.last_pings(3);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].timestamp, at(5));
        assert_eq!(site.last_ping().map(|p| p.timestamp), Some(at(7)));
        assert_eq!(site.last_pings(50).len(), 7);
    }

    #[test]
    fn test_unique_ids_differ() {
        assert_ne!(site(4).unique_id(), site(4).unique_id());
    }

    #[tokio::test]
    async fn test_record_round_trips_through_json() {
        let (ctx, _) = context();
        let mut site = site(4);
        site.record_ping(&success("Welcome", 1), ORIGIN, &ctx).await;

        let json = serde_json::to_string(&site).unwrap();
        let back: TrackedSite = serde_json::from_str(&json).unwrap();
        assert_eq!(back, site);
    }
}
