//! Postgres adapters for the core storage seams.
//!
//! [`PgHistoryLog`] and [`PgContentStore`] wrap the repositories behind the
//! `HistoryLog`/`ContentStore` traits so the lifecycle dispatcher stays
//! backend-agnostic.

use async_trait::async_trait;

use atrium_core::history::{HistoryRecord, HistoryStatus, SubjectRef};
use atrium_core::store::{ContentStore, HistoryLog, StoreError};
use atrium_core::types::DbId;

use crate::models::history::CreateHistoryEntry;
use crate::repositories::{ContentRepo, HistoryRepo};
use crate::DbPool;

// ---------------------------------------------------------------------------
// PgHistoryLog
// ---------------------------------------------------------------------------

/// History log backed by the `history_entries` table.
#[derive(Debug, Clone)]
pub struct PgHistoryLog {
    pool: DbPool,
}

impl PgHistoryLog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryLog for PgHistoryLog {
    async fn log(
        &self,
        subject: &SubjectRef,
        status: HistoryStatus,
        actor_id: Option<DbId>,
        message: &str,
    ) -> Result<(), StoreError> {
        let entry = CreateHistoryEntry::new(subject, status, actor_id, message);
        HistoryRepo::insert(&self.pool, &entry)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn get_last(
        &self,
        subject: &SubjectRef,
        statuses: &[HistoryStatus],
    ) -> Result<Option<HistoryRecord>, StoreError> {
        let entry = HistoryRepo::get_last(&self.pool, subject, statuses)
            .await
            .map_err(StoreError::backend)?;

        entry
            .map(|e| e.to_record().map_err(StoreError::Backend))
            .transpose()
    }

    async fn has_been(
        &self,
        subject: &SubjectRef,
        statuses: &[HistoryStatus],
    ) -> Result<bool, StoreError> {
        HistoryRepo::has_been(&self.pool, subject, statuses)
            .await
            .map_err(StoreError::backend)
    }

    async fn delete_for(&self, subject: &SubjectRef) -> Result<u64, StoreError> {
        HistoryRepo::delete_for(&self.pool, subject)
            .await
            .map_err(StoreError::backend)
    }
}

// ---------------------------------------------------------------------------
// PgContentStore
// ---------------------------------------------------------------------------

/// Content row operations backed by the `content_items` table.
#[derive(Debug, Clone)]
pub struct PgContentStore {
    pool: DbPool,
}

impl PgContentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn exists(&self, subject: &SubjectRef) -> Result<bool, StoreError> {
        ContentRepo::exists(&self.pool, subject)
            .await
            .map_err(StoreError::backend)
    }

    async fn mark_notified(
        &self,
        subject: &SubjectRef,
        publish_notified: Option<bool>,
        unpublish_notified: Option<bool>,
    ) -> Result<(), StoreError> {
        // Zero rows affected means the row is gone; that is a no-op here.
        ContentRepo::mark_notified(&self.pool, subject, publish_notified, unpublish_notified)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn delete(&self, subject: &SubjectRef) -> Result<bool, StoreError> {
        ContentRepo::delete(&self.pool, subject)
            .await
            .map_err(StoreError::backend)
    }
}
