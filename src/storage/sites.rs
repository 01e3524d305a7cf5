//! Persistence of tracked sites.
//!
//! Each site is one JSON document in `tracked_sites`, flagged as active or
//! archived. Every mutating call commits before returning.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;
use crate::tracked::TrackedSite;

/// The two site collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// Sites visible to the survey loop
    Active,
    /// Sites put away by an operator
    Archived,
}

impl Collection {
    fn flag(self) -> i64 {
        match self {
            Collection::Active => 0,
            Collection::Archived => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Active => "active",
            Collection::Archived => "archive",
        }
    }
}

/// Site store backed by the SQLite pool.
#[derive(Clone)]
pub struct SiteStore {
    pool: Arc<SqlitePool>,
}

impl SiteStore {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// All sites in `collection`, ordered by id.
    pub async fn all(&self, collection: Collection) -> Result<Vec<TrackedSite>, DatabaseError> {
        let records: Vec<String> = sqlx::query_scalar(
            "SELECT record FROM tracked_sites WHERE archived = ? ORDER BY unique_id",
        )
        .bind(collection.flag())
        .fetch_all(self.pool.as_ref())
        .await?;

        records
            .iter()
            .map(|record| serde_json::from_str(record).map_err(DatabaseError::from))
            .collect()
    }

    /// The site with `id` in `collection`, if any.
    pub async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<TrackedSite>, DatabaseError> {
        let record: Option<String> = sqlx::query_scalar(
            "SELECT record FROM tracked_sites WHERE unique_id = ? AND archived = ?",
        )
        .bind(id)
        .bind(collection.flag())
        .fetch_optional(self.pool.as_ref())
        .await?;

        record
            .map(|r| serde_json::from_str(&r).map_err(DatabaseError::from))
            .transpose()
    }

    /// Inserts or replaces `site` in `collection`.
    pub async fn upsert(&self, collection: Collection, site: &TrackedSite) -> Result<(), DatabaseError> {
        let record = serde_json::to_string(site)?;
        sqlx::query(
            "INSERT INTO tracked_sites (unique_id, archived, record, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(unique_id) DO UPDATE SET
                archived = excluded.archived,
                record = excluded.record,
                updated_at = excluded.updated_at",
        )
        .bind(site.unique_id())
        .bind(collection.flag())
        .bind(record)
        .bind(Utc::now().timestamp_millis())
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    /// Replaces the stored copy of `site`, provided it is still in `collection`.
    ///
    /// Returns `false` without writing if the site has since been moved or
    /// removed, so a stale copy never brings a site back.
    pub async fn update(
        &self,
        collection: Collection,
        site: &TrackedSite,
    ) -> Result<bool, DatabaseError> {
        let record = serde_json::to_string(site)?;
        let result = sqlx::query(
            "UPDATE tracked_sites SET record = ?, updated_at = ?
             WHERE unique_id = ? AND archived = ?",
        )
        .bind(record)
        .bind(Utc::now().timestamp_millis())
        .bind(site.unique_id())
        .bind(collection.flag())
        .execute(self.pool.as_ref())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes `id` from `collection`. Returns whether a row was removed.
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM tracked_sites WHERE unique_id = ? AND archived = ?")
            .bind(id)
            .bind(collection.flag())
            .execute(self.pool.as_ref())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Writes `site` into `to`, provided it is currently in `from`.
    ///
    /// Both the state change and the move commit together. Returns `false`
    /// without writing if the site is not in `from`.
    pub async fn move_to(
        &self,
        site: &TrackedSite,
        from: Collection,
        to: Collection,
    ) -> Result<bool, DatabaseError> {
        let record = serde_json::to_string(site)?;
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE tracked_sites SET archived = ?, record = ?, updated_at = ?
             WHERE unique_id = ? AND archived = ?",
        )
        .bind(to.flag())
        .bind(record)
        .bind(Utc::now().timestamp_millis())
        .bind(site.unique_id())
        .bind(from.flag())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }
        tx.commit().await?;
        Ok(true)
    }
}
