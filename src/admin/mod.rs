//! Administrative actions on tracked sites.
//!
//! Every action that changes an existing record takes that record's lock first,
//! waiting at most the configured lock wait. When the wait runs out the action
//! fails with a lock error and the record is untouched.

mod notify;
mod url;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::error_handling::AdminError;
use crate::events::EventLog;
use crate::storage::{Collection, RecordGuard, RecordLocks, SiteStore};
use crate::tracked::TrackedSite;
use crate::utils::parse_timestamp;

pub use notify::{LogNotifier, Notifier};
pub use self::url::validate_and_normalize_url;

/// Operator-facing operations over the site store.
#[derive(Clone)]
pub struct Admin {
    store: SiteStore,
    locks: RecordLocks,
    events: EventLog,
    lock_wait: Duration,
    max_stop_signals: u32,
    notifier: Option<Arc<dyn Notifier>>,
}

impl Admin {
    /// A `max_stop_signals` of zero is raised to one; a site always gets at
    /// least one probe before it can be declared down.
    pub fn new(
        store: SiteStore,
        locks: RecordLocks,
        events: EventLog,
        lock_wait: Duration,
        max_stop_signals: u32,
    ) -> Self {
        Self {
            store,
            locks,
            events,
            lock_wait,
            max_stop_signals: max_stop_signals.max(1),
            notifier: None,
        }
    }

    /// Sends every new submission to `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Starts tracking a new site.
    ///
    /// `start_time` uses the display pattern (`05 Aug 2006 18:44 EDT`); when it
    /// is absent or blank, tracking starts now.
    pub async fn add_site(
        &self,
        label: &str,
        url: &str,
        start_time: Option<&str>,
    ) -> Result<TrackedSite, AdminError> {
        let url = validate_and_normalize_url(url)?;
        let start = match start_time.map(str::trim).filter(|s| !s.is_empty()) {
            Some(text) => {
                parse_timestamp(text).ok_or_else(|| AdminError::InvalidStartTime(text.to_string()))?
            }
            None => Utc::now(),
        };

        let site = TrackedSite::new(label.trim(), url, start, self.max_stop_signals);
        self.store.upsert(Collection::Active, &site).await?;
        self.events
            .record(format!("Added {} ({}) as {}", site.label(), site.url(), site.unique_id()));
        if let Some(notifier) = &self.notifier {
            notifier.site_submitted(&site);
        }
        Ok(site)
    }

    /// Stops a running site and moves it to the archive.
    pub async fn archive_site(&self, id: &str) -> Result<TrackedSite, AdminError> {
        let guard = self.locks.lock(id, self.lock_wait).await?;
        let result = self.archive_locked(id).await;
        release(guard).await;
        result
    }

    async fn archive_locked(&self, id: &str) -> Result<TrackedSite, AdminError> {
        let mut site = self.load(Collection::Active, id).await?;
        if site.is_running() {
            site.stop();
        }
        self.relocate(&site, Collection::Active, Collection::Archived)
            .await?;
        self.events.record(format!("Archived {}", site.label()));
        Ok(site)
    }

    /// Moves an archived site back and resumes tracking it.
    pub async fn unarchive_site(&self, id: &str) -> Result<TrackedSite, AdminError> {
        let guard = self.locks.lock(id, self.lock_wait).await?;
        let result = self.unarchive_locked(id).await;
        release(guard).await;
        result
    }

    async fn unarchive_locked(&self, id: &str) -> Result<TrackedSite, AdminError> {
        let mut site = self.load(Collection::Archived, id).await?;
        site.start();
        self.relocate(&site, Collection::Archived, Collection::Active)
            .await?;
        self.events.record(format!("Unarchived {}", site.label()));
        Ok(site)
    }

    /// Resumes tracking a stopped active site.
    pub async fn reactivate_site(&self, id: &str) -> Result<TrackedSite, AdminError> {
        let guard = self.locks.lock(id, self.lock_wait).await?;
        let result = self.reactivate_locked(id).await;
        release(guard).await;
        result
    }

    async fn reactivate_locked(&self, id: &str) -> Result<TrackedSite, AdminError> {
        let mut site = self.load(Collection::Active, id).await?;
        if site.is_running() {
            return Err(AdminError::InvalidState {
                id: id.to_string(),
                reason: "site is already running",
            });
        }
        site.start();
        self.save(&site).await?;
        self.events.record(format!("Reactivated {}", site.label()));
        Ok(site)
    }

    /// Deletes a site for good. Only archived sites can be removed.
    pub async fn remove_site(&self, id: &str) -> Result<(), AdminError> {
        let guard = self.locks.lock(id, self.lock_wait).await?;
        let result = self.remove_locked(id).await;
        release(guard).await;
        result
    }

    async fn remove_locked(&self, id: &str) -> Result<(), AdminError> {
        if !self.store.delete(Collection::Archived, id).await? {
            if self.store.get(Collection::Active, id).await?.is_some() {
                return Err(AdminError::InvalidState {
                    id: id.to_string(),
                    reason: "only archived sites can be removed",
                });
            }
            return Err(AdminError::NotFound(id.to_string()));
        }
        self.events.record(format!("Removed {}", id));
        Ok(())
    }

    /// Drops an active site's content profile so the next capture rebuilds it.
    pub async fn clear_content_profile(&self, id: &str) -> Result<TrackedSite, AdminError> {
        let guard = self.locks.lock(id, self.lock_wait).await?;
        let result = self.clear_profile_locked(id).await;
        release(guard).await;
        result
    }

    async fn clear_profile_locked(&self, id: &str) -> Result<TrackedSite, AdminError> {
        let mut site = self.load(Collection::Active, id).await?;
        site.clear_content_profile();
        self.save(&site).await?;
        self.events
            .record(format!("Cleared content profile of {}", site.label()));
        Ok(site)
    }

    /// All sites in `collection`.
    pub async fn list(&self, collection: Collection) -> Result<Vec<TrackedSite>, AdminError> {
        Ok(self.store.all(collection).await?)
    }

    async fn load(&self, collection: Collection, id: &str) -> Result<TrackedSite, AdminError> {
        self.store
            .get(collection, id)
            .await?
            .ok_or_else(|| AdminError::NotFound(id.to_string()))
    }

    async fn save(&self, site: &TrackedSite) -> Result<(), AdminError> {
        if self.store.update(Collection::Active, site).await? {
            Ok(())
        } else {
            Err(AdminError::NotFound(site.unique_id().to_string()))
        }
    }

    async fn relocate(
        &self,
        site: &TrackedSite,
        from: Collection,
        to: Collection,
    ) -> Result<(), AdminError> {
        if self.store.move_to(site, from, to).await? {
            Ok(())
        } else {
            Err(AdminError::NotFound(site.unique_id().to_string()))
        }
    }
}

async fn release(guard: RecordGuard) {
    let key = guard.key().to_string();
    if let Err(e) = guard.release().await {
        log::warn!("Failed to release lock on {}: {}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::create_test_pool;
    use crate::tracked::SiteStatus;
    use chrono::TimeZone;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingNotifier {
        seen: Mutex<Vec<String>>,
    }

    impl Notifier for CollectingNotifier {
        fn site_submitted(&self, site: &TrackedSite) {
            self.seen.lock().unwrap().push(site.url().to_string());
        }
    }

    async fn admin() -> (Admin, SiteStore, RecordLocks) {
        let pool = Arc::new(create_test_pool().await);
        let store = SiteStore::new(pool.clone());
        let locks = RecordLocks::new(pool);
        let admin = Admin::new(
            store.clone(),
            locks.clone(),
            EventLog::new(10),
            Duration::from_millis(50),
            4,
        );
        (admin, store, locks)
    }

    #[tokio::test]
    async fn test_add_site_parses_start_time_and_notifies() {
        let (admin, store, _) = admin().await;
        let notifier = Arc::new(CollectingNotifier::default());
        let admin = admin.with_notifier(notifier.clone());

        let site = admin
            .add_site("paypal clone", "http://phish.test/login", Some("05 Aug 2006 18:44 EDT"))
            .await
            .unwrap();

        assert_eq!(
            site.start_time(),
            Utc.with_ymd_and_hms(2006, 8, 5, 22, 44, 0).unwrap()
        );
        assert_eq!(site.max_stop_signals(), 4);
        assert_eq!(site.status(), SiteStatus::Running);
        assert!(store
            .get(Collection::Active, site.unique_id())
            .await
            .unwrap()
            .is_some());
        assert_eq!(
            *notifier.seen.lock().unwrap(),
            vec!["http://phish.test/login".to_string()]
        );
    }

    #[tokio::test]
    async fn test_add_site_rejects_bad_input() {
        let (admin, store, _) = admin().await;

        let bad_url = admin.add_site("x", "phish.test/login", None).await;
        assert!(matches!(bad_url, Err(AdminError::InvalidUrl(_))));

        let bad_time = admin
            .add_site("x", "http://phish.test/", Some("yesterday"))
            .await;
        assert!(matches!(bad_time, Err(AdminError::InvalidStartTime(_))));

        assert!(store.all(Collection::Active).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_start_time_means_now() {
        let (admin, _, _) = admin().await;
        let before = Utc::now();
        let site = admin
            .add_site("x", "http://phish.test/", Some("   "))
            .await
            .unwrap();
        assert!(site.start_time() >= before);
    }

    #[tokio::test]
    async fn test_archive_and_unarchive() {
        let (admin, store, _) = admin().await;
        let site = admin.add_site("x", "http://phish.test/", None).await.unwrap();
        let id = site.unique_id();

        let archived = admin.archive_site(id).await.unwrap();
        assert_eq!(archived.status(), SiteStatus::Stopped);
        assert!(store.get(Collection::Active, id).await.unwrap().is_none());
        assert!(store.get(Collection::Archived, id).await.unwrap().is_some());

        let restored = admin.unarchive_site(id).await.unwrap();
        assert!(restored.is_running());
        assert_eq!(restored.stop_time(), None);
        assert!(store.get(Collection::Active, id).await.unwrap().is_some());
        assert!(store.get(Collection::Archived, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_archive_keeps_existing_stop_time() {
        let (admin, store, _) = admin().await;
        let mut site = admin.add_site("x", "http://phish.test/", None).await.unwrap();
        site.stop();
        let stopped_at = site.stop_time();
        store.upsert(Collection::Active, &site).await.unwrap();

        let archived = admin.archive_site(site.unique_id()).await.unwrap();
        assert_eq!(archived.stop_time(), stopped_at);
    }

    #[tokio::test]
    async fn test_reactivate_only_stopped_sites() {
        let (admin, store, _) = admin().await;
        let mut site = admin.add_site("x", "http://phish.test/", None).await.unwrap();
        let id = site.unique_id().to_string();

        let err = admin.reactivate_site(&id).await.unwrap_err();
        assert!(matches!(err, AdminError::InvalidState { .. }));

        site.stop();
        store.upsert(Collection::Active, &site).await.unwrap();
        let reactivated = admin.reactivate_site(&id).await.unwrap();
        assert!(reactivated.is_running());
        assert_eq!(reactivated.stop_signals(), 0);
    }

    #[tokio::test]
    async fn test_remove_requires_archive() {
        let (admin, store, _) = admin().await;
        let site = admin.add_site("x", "http://phish.test/", None).await.unwrap();
        let id = site.unique_id();

        let err = admin.remove_site(id).await.unwrap_err();
        assert!(matches!(err, AdminError::InvalidState { .. }));
        assert!(store.get(Collection::Active, id).await.unwrap().is_some());

        admin.archive_site(id).await.unwrap();
        admin.remove_site(id).await.unwrap();
        assert!(store.get(Collection::Archived, id).await.unwrap().is_none());

        let missing = admin.remove_site(id).await.unwrap_err();
        assert!(matches!(missing, AdminError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_locked_record_times_out_unmodified() {
        let (admin, store, locks) = admin().await;
        let site = admin.add_site("x", "http://phish.test/", None).await.unwrap();
        let id = site.unique_id();
        let _held = locks.try_lock(id).await.unwrap().unwrap();

        let err = admin.archive_site(id).await.unwrap_err();
        assert!(matches!(err, AdminError::Lock(_)));
        assert!(err.to_string().contains("Could not get exclusive lock"));

        let unchanged = store.get(Collection::Active, id).await.unwrap().unwrap();
        assert_eq!(unchanged, site);
    }

    #[tokio::test]
    async fn test_clear_content_profile_persists() {
        let (admin, store, _) = admin().await;
        let site = admin.add_site("x", "http://phish.test/", None).await.unwrap();

        let cleared = admin.clear_content_profile(site.unique_id()).await.unwrap();
        assert!(cleared.content_profile().is_none());
        let saved = store
            .get(Collection::Active, site.unique_id())
            .await
            .unwrap()
            .unwrap();
        assert!(saved.content_profile().is_none());
    }

    #[tokio::test]
    async fn test_zero_threshold_is_raised_to_one() {
        let pool = Arc::new(create_test_pool().await);
        let admin = Admin::new(
            SiteStore::new(pool.clone()),
            RecordLocks::new(pool),
            EventLog::new(10),
            Duration::from_millis(50),
            0,
        );
        let site = admin.add_site("x", "http://phish.test/", None).await.unwrap();
        assert_eq!(site.max_stop_signals(), 1);
    }

    #[tokio::test]
    async fn test_lock_is_released_after_failed_action() {
        let (admin, _, locks) = admin().await;
        let site = admin.add_site("x", "http://phish.test/", None).await.unwrap();
        let id = site.unique_id();

        assert!(admin.reactivate_site(id).await.is_err());
        assert!(locks.try_lock(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let (admin, _, _) = admin().await;
        for result in [
            admin.archive_site("nope").await,
            admin.unarchive_site("nope").await,
            admin.reactivate_site("nope").await,
            admin.clear_content_profile("nope").await,
        ] {
            assert!(matches!(result, Err(AdminError::NotFound(_))));
        }
    }
}
