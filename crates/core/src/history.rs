//! History status vocabulary and the polymorphic subject key.
//!
//! Every content entity accumulates an append-only trail of
//! [`HistoryRecord`]s keyed by a [`SubjectRef`] — a `(content_type, id)`
//! pair rather than a typed foreign key, so heterogeneous entity types
//! share one history store.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Status strings as stored in the `history_entries.status` column.
pub mod status_values {
    pub const CREATED: &str = "created";
    pub const CHANGED: &str = "changed";
    pub const PUBLISHED: &str = "published";
    pub const UNPUBLISHED: &str = "unpublished";
}

/// All valid history status strings.
pub const VALID_HISTORY_STATUSES: &[&str] = &[
    status_values::CREATED,
    status_values::CHANGED,
    status_values::PUBLISHED,
    status_values::UNPUBLISHED,
];

// ---------------------------------------------------------------------------
// HistoryStatus
// ---------------------------------------------------------------------------

/// Kind of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    Created,
    Changed,
    Published,
    Unpublished,
}

impl HistoryStatus {
    /// The two statuses that participate in the publish lifecycle.
    ///
    /// The "current" lifecycle state of an entity is reconstructed from its
    /// most recent entry with one of these statuses.
    pub const LIFECYCLE: [Self; 2] = [Self::Published, Self::Unpublished];

    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            status_values::CREATED => Ok(Self::Created),
            status_values::CHANGED => Ok(Self::Changed),
            status_values::PUBLISHED => Ok(Self::Published),
            status_values::UNPUBLISHED => Ok(Self::Unpublished),
            _ => Err(format!(
                "Invalid history status '{s}'. Must be one of: {}",
                VALID_HISTORY_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => status_values::CREATED,
            Self::Changed => status_values::CHANGED,
            Self::Published => status_values::PUBLISHED,
            Self::Unpublished => status_values::UNPUBLISHED,
        }
    }
}

// ---------------------------------------------------------------------------
// SubjectRef
// ---------------------------------------------------------------------------

/// Polymorphic reference to a content entity.
///
/// `content_type` is the qualified registry name (e.g. `"intranet.newsitem"`)
/// and `id` the entity's database id. History entries never hold a typed
/// foreign key; referential integrity is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectRef {
    pub content_type: String,
    pub id: DbId,
}

impl SubjectRef {
    pub fn new(content_type: impl Into<String>, id: DbId) -> Self {
        Self {
            content_type: content_type.into(),
            id,
        }
    }
}

impl std::fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.content_type, self.id)
    }
}

// ---------------------------------------------------------------------------
// HistoryRecord
// ---------------------------------------------------------------------------

/// A single history entry as read back from the store. Immutable.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRecord {
    pub subject: SubjectRef,
    pub status: HistoryStatus,
    pub actor_id: Option<DbId>,
    pub message: String,
    pub happened_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        for status in &[
            HistoryStatus::Created,
            HistoryStatus::Changed,
            HistoryStatus::Published,
            HistoryStatus::Unpublished,
        ] {
            assert_eq!(
                HistoryStatus::from_str_value(status.as_str()).unwrap(),
                *status
            );
        }
    }

    #[test]
    fn invalid_status_rejected() {
        let result = HistoryStatus::from_str_value("archived");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid history status"));
    }

    #[test]
    fn status_values_complete() {
        assert_eq!(VALID_HISTORY_STATUSES.len(), 4);
    }

    #[test]
    fn lifecycle_statuses() {
        assert_eq!(
            HistoryStatus::LIFECYCLE,
            [HistoryStatus::Published, HistoryStatus::Unpublished]
        );
    }

    #[test]
    fn subject_ref_display() {
        let subject = SubjectRef::new("intranet.newsitem", 42);
        assert_eq!(subject.to_string(), "intranet.newsitem:42");
    }

    #[test]
    fn subject_refs_compare_by_type_and_id() {
        assert_eq!(
            SubjectRef::new("intranet.newsitem", 1),
            SubjectRef::new("intranet.newsitem", 1)
        );
        assert_ne!(
            SubjectRef::new("intranet.newsitem", 1),
            SubjectRef::new("intranet.event", 1)
        );
    }
}
