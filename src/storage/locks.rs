//! Per-record exclusive locks kept in the database.
//!
//! A lock is a lease row in `record_locks`, so every process that opens the
//! same database file sees the same locks. The survey loop never waits: if a
//! record is held it is skipped until the next pass. Administrative actions
//! poll up to a bounded time and then give up.
//!
//! Callers release a guard with [`RecordGuard::release`]. A guard dropped
//! without it (early return, panic) releases from a spawned task, and a lease
//! left behind by a crashed process expires after [`LOCK_LEASE_TTL`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::Rng;
use sqlx::SqlitePool;

use crate::config::{LOCK_LEASE_TTL, LOCK_POLL_INTERVAL};
use crate::error_handling::{DatabaseError, LockError};

/// Held lock on one record.
#[derive(Debug)]
pub struct RecordGuard {
    key: String,
    lease: String,
    pool: Arc<SqlitePool>,
    released: bool,
}

impl RecordGuard {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Deletes the lease row, making the record available immediately.
    pub async fn release(mut self) -> Result<(), DatabaseError> {
        self.released = true;
        delete_lease(&self.pool, &self.key, &self.lease).await
    }
}

impl Drop for RecordGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let (pool, key, lease) = (self.pool.clone(), self.key.clone(), self.lease.clone());
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = delete_lease(&pool, &key, &lease).await {
                        log::warn!("Failed to release lock on {}: {}", key, e);
                    }
                });
            }
            Err(_) => log::warn!(
                "Lock on {} dropped outside a runtime; it is held until its lease expires",
                key
            ),
        }
    }
}

async fn delete_lease(pool: &SqlitePool, key: &str, lease: &str) -> Result<(), DatabaseError> {
    // Matching on the lease leaves a newer holder's row alone
    sqlx::query("DELETE FROM record_locks WHERE unique_id = ? AND lease = ?")
        .bind(key)
        .bind(lease)
        .execute(pool)
        .await?;
    Ok(())
}

/// Lock table shared by the scheduler and admin actions, in this process and
/// in any other process on the same database.
#[derive(Clone)]
pub struct RecordLocks {
    pool: Arc<SqlitePool>,
    ttl: Duration,
}

impl RecordLocks {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            pool,
            ttl: LOCK_LEASE_TTL,
        }
    }

    /// Overrides the lease lifetime.
    pub fn with_lease_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Takes the lock if it is free right now.
    ///
    /// A row whose lease has expired counts as free.
    pub async fn try_lock(&self, key: &str) -> Result<Option<RecordGuard>, DatabaseError> {
        let lease = format!("{}-{:016x}", std::process::id(), rand::rng().random::<u64>());
        let now = Utc::now().timestamp_millis();
        let expires_at = now.saturating_add(i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX));

        let result = sqlx::query(
            "INSERT INTO record_locks (unique_id, lease, expires_at) VALUES (?, ?, ?)
             ON CONFLICT(unique_id) DO UPDATE SET
                lease = excluded.lease,
                expires_at = excluded.expires_at
             WHERE record_locks.expires_at <= ?",
        )
        .bind(key)
        .bind(&lease)
        .bind(expires_at)
        .bind(now)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(RecordGuard {
            key: key.to_string(),
            lease,
            pool: self.pool.clone(),
            released: false,
        }))
    }

    /// Waits up to `wait` for the lock.
    ///
    /// # Errors
    ///
    /// Returns `LockError::Timeout` if the lock is still held when `wait` runs
    /// out, or `LockError::Store` if the lock table is unusable.
    pub async fn lock(&self, key: &str, wait: Duration) -> Result<RecordGuard, LockError> {
        let started = Instant::now();
        let deadline = started + wait;
        loop {
            if let Some(guard) = self.try_lock(key).await? {
                return Ok(guard);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(LockError::Timeout {
                    key: key.to_string(),
                    waited_ms: started.elapsed().as_millis(),
                });
            }
            tokio::time::sleep(LOCK_POLL_INTERVAL.min(deadline - now)).await;
        }
    }
}
