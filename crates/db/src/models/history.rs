//! History entry entity model and DTO.
//!
//! History rows are append-only and immutable once created (no
//! `updated_at`). The subject is a polymorphic `(subject_type, subject_id)`
//! pair, not a foreign key, so any registered content type can log here.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atrium_core::history::{HistoryRecord, HistoryStatus, SubjectRef};
use atrium_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// History entry entity
// ---------------------------------------------------------------------------

/// A single history row as stored in `history_entries`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HistoryEntry {
    pub id: DbId,
    pub subject_type: String,
    pub subject_id: DbId,
    pub status: String,
    pub actor_id: Option<DbId>,
    pub message: String,
    pub happened_at: Timestamp,
}

impl HistoryEntry {
    /// Polymorphic subject key for this entry.
    pub fn subject(&self) -> SubjectRef {
        SubjectRef::new(self.subject_type.clone(), self.subject_id)
    }

    /// Convert to the domain record, parsing the stored status string.
    pub fn to_record(&self) -> Result<HistoryRecord, String> {
        Ok(HistoryRecord {
            subject: self.subject(),
            status: HistoryStatus::from_str_value(&self.status)?,
            actor_id: self.actor_id,
            message: self.message.clone(),
            happened_at: self.happened_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// DTO for appending a history entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateHistoryEntry {
    pub subject_type: String,
    pub subject_id: DbId,
    pub status: String,
    pub actor_id: Option<DbId>,
    #[serde(default)]
    pub message: String,
}

impl CreateHistoryEntry {
    pub fn new(
        subject: &SubjectRef,
        status: HistoryStatus,
        actor_id: Option<DbId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            subject_type: subject.content_type.clone(),
            subject_id: subject.id,
            status: status.as_str().to_string(),
            actor_id,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
