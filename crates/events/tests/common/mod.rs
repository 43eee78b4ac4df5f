//! In-memory store implementations and probes for dispatcher tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use atrium_core::history::{HistoryRecord, HistoryStatus, SubjectRef};
use atrium_core::store::{ContentStore, HistoryLog, StoreError};
use atrium_core::types::DbId;
use atrium_events::bus::ContentEvent;
use atrium_events::dispatcher::LifecycleListener;
use atrium_events::EventKind;

// ---------------------------------------------------------------------------
// MemoryHistoryLog
// ---------------------------------------------------------------------------

/// Append-only history log held in memory. Insertion order stands in for
/// timestamp order, so same-instant appends resolve deterministically.
#[derive(Default)]
pub struct MemoryHistoryLog {
    entries: Mutex<Vec<HistoryRecord>>,
}

impl MemoryHistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All statuses logged for a subject, oldest first.
    pub fn statuses_for(&self, subject: &SubjectRef) -> Vec<HistoryStatus> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|record| &record.subject == subject)
            .map(|record| record.status)
            .collect()
    }
}

#[async_trait]
impl HistoryLog for MemoryHistoryLog {
    async fn log(
        &self,
        subject: &SubjectRef,
        status: HistoryStatus,
        actor_id: Option<DbId>,
        message: &str,
    ) -> Result<(), StoreError> {
        self.entries.lock().unwrap().push(HistoryRecord {
            subject: subject.clone(),
            status,
            actor_id,
            message: message.to_string(),
            happened_at: Utc::now(),
        });
        Ok(())
    }

    async fn get_last(
        &self,
        subject: &SubjectRef,
        statuses: &[HistoryStatus],
    ) -> Result<Option<HistoryRecord>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|record| {
                &record.subject == subject
                    && (statuses.is_empty() || statuses.contains(&record.status))
            })
            .cloned())
    }

    async fn has_been(
        &self,
        subject: &SubjectRef,
        statuses: &[HistoryStatus],
    ) -> Result<bool, StoreError> {
        Ok(self.get_last(subject, statuses).await?.is_some())
    }

    async fn delete_for(&self, subject: &SubjectRef) -> Result<u64, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|record| &record.subject != subject);
        Ok((before - entries.len()) as u64)
    }
}

// ---------------------------------------------------------------------------
// MemoryContentStore
// ---------------------------------------------------------------------------

/// Notification flag pair for a stored row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub publish_notified: bool,
    pub unpublish_notified: bool,
}

/// Content rows held in memory; presence in the map means the row exists.
#[derive(Default)]
pub struct MemoryContentStore {
    rows: Mutex<HashMap<SubjectRef, Flags>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a row as existing with cleared flags.
    pub fn insert(&self, subject: &SubjectRef) {
        self.rows
            .lock()
            .unwrap()
            .insert(subject.clone(), Flags::default());
    }

    pub fn contains(&self, subject: &SubjectRef) -> bool {
        self.rows.lock().unwrap().contains_key(subject)
    }

    pub fn flags(&self, subject: &SubjectRef) -> Option<Flags> {
        self.rows.lock().unwrap().get(subject).copied()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn exists(&self, subject: &SubjectRef) -> Result<bool, StoreError> {
        Ok(self.contains(subject))
    }

    async fn mark_notified(
        &self,
        subject: &SubjectRef,
        publish_notified: Option<bool>,
        unpublish_notified: Option<bool>,
    ) -> Result<(), StoreError> {
        // A vanished row is a no-op, matching the relational store.
        if let Some(flags) = self.rows.lock().unwrap().get_mut(subject) {
            if let Some(value) = publish_notified {
                flags.publish_notified = value;
            }
            if let Some(value) = unpublish_notified {
                flags.unpublish_notified = value;
            }
        }
        Ok(())
    }

    async fn delete(&self, subject: &SubjectRef) -> Result<bool, StoreError> {
        Ok(self.rows.lock().unwrap().remove(subject).is_some())
    }
}

// ---------------------------------------------------------------------------
// Listener probes
// ---------------------------------------------------------------------------

/// Records every event kind it sees, in order.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<EventKind>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

#[async_trait]
impl LifecycleListener for RecordingListener {
    fn name(&self) -> &'static str {
        "recorder"
    }

    async fn on_event(&self, event: &ContentEvent) -> Result<(), StoreError> {
        self.events.lock().unwrap().push(event.kind);
        Ok(())
    }
}

/// Always fails, to prove listener errors never abort a transition.
pub struct FailingListener;

#[async_trait]
impl LifecycleListener for FailingListener {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn on_event(&self, _event: &ContentEvent) -> Result<(), StoreError> {
        Err(StoreError::backend("listener blew up"))
    }
}
