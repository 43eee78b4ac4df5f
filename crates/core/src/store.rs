//! Storage trait seams.
//!
//! The lifecycle dispatcher talks to persistence exclusively through these
//! traits, so the state machine can be exercised against an in-memory
//! implementation and the Postgres adapters live in the db crate.

use async_trait::async_trait;
use thiserror::Error;

use crate::history::{HistoryRecord, HistoryStatus, SubjectRef};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Error surfaced by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Wrap a backend error, keeping its display form.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// HistoryLog
// ---------------------------------------------------------------------------

/// Append-only history log keyed by [`SubjectRef`].
///
/// `log` never validates the subject reference; callers own referential
/// integrity. A failed append must surface as an error — the dispatcher
/// relies on the log as its idempotence guard.
#[async_trait]
pub trait HistoryLog: Send + Sync {
    /// Append one entry for the subject.
    async fn log(
        &self,
        subject: &SubjectRef,
        status: HistoryStatus,
        actor_id: Option<DbId>,
        message: &str,
    ) -> Result<(), StoreError>;

    /// Most recent entry for the subject, optionally restricted to the given
    /// statuses. An empty status slice means "any status".
    async fn get_last(
        &self,
        subject: &SubjectRef,
        statuses: &[HistoryStatus],
    ) -> Result<Option<HistoryRecord>, StoreError>;

    /// Whether any entry exists for the subject, with the same filter
    /// semantics as [`get_last`](Self::get_last).
    async fn has_been(
        &self,
        subject: &SubjectRef,
        statuses: &[HistoryStatus],
    ) -> Result<bool, StoreError>;

    /// Remove every entry for the subject. Returns the number removed.
    async fn delete_for(&self, subject: &SubjectRef) -> Result<u64, StoreError>;
}

// ---------------------------------------------------------------------------
// ContentStore
// ---------------------------------------------------------------------------

/// Row-level operations the dispatcher needs on content entities.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Whether the entity row still exists.
    async fn exists(&self, subject: &SubjectRef) -> Result<bool, StoreError>;

    /// Update the denormalized notification flags directly on the row,
    /// without running the save pipeline again. `None` leaves a flag
    /// untouched. Updating a row that no longer exists is a no-op.
    async fn mark_notified(
        &self,
        subject: &SubjectRef,
        publish_notified: Option<bool>,
        unpublish_notified: Option<bool>,
    ) -> Result<(), StoreError>;

    /// Remove the entity row. Returns whether a row was removed.
    async fn delete(&self, subject: &SubjectRef) -> Result<bool, StoreError>;
}
