//! Content item entity model and DTOs.
//!
//! `content_items` is the shared storage for every registered content type;
//! the `content_type` column carries the qualified registry name, so a row
//! is addressed polymorphically as `(content_type, id)`.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atrium_core::content::{self, states, ContentSnapshot, MAX_TITLE_LENGTH};
use atrium_core::history::SubjectRef;
use atrium_core::publish::PublishWindow;
use atrium_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Content item entity
// ---------------------------------------------------------------------------

/// A content row as stored in `content_items`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentItem {
    pub id: DbId,
    pub content_type: String,
    pub title: String,
    pub keywords: Option<String>,
    pub creator_id: Option<DbId>,
    pub changed_by_id: Option<DbId>,
    pub parent_group_id: Option<DbId>,
    pub is_tmp: bool,
    pub state: String,
    pub publish_from: Option<Timestamp>,
    pub publish_to: Option<Timestamp>,
    pub publish_notified: bool,
    pub unpublish_notified: bool,
    pub remove_after_publish_to: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ContentItem {
    /// Polymorphic subject key for this row.
    pub fn subject(&self) -> SubjectRef {
        SubjectRef::new(self.content_type.clone(), self.id)
    }

    /// The row's publish window.
    pub fn window(&self) -> PublishWindow {
        PublishWindow::new(self.publish_from, self.publish_to)
    }

    /// Build the dispatcher's view of this row.
    pub fn snapshot(&self) -> ContentSnapshot {
        ContentSnapshot {
            subject: self.subject(),
            title: self.title.clone(),
            is_tmp: self.is_tmp,
            state: self.state.clone(),
            window: self.window(),
            remove_after_publish_to: self.remove_after_publish_to,
            creator_id: self.creator_id,
            changed_by_id: self.changed_by_id,
        }
    }

    /// Keywords split for display.
    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords
            .as_deref()
            .map(content::keyword_list)
            .unwrap_or_default()
    }

    /// URL slug derived from the title.
    pub fn slug(&self) -> String {
        content::slugify(&self.title)
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// DTO for inserting a new content item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentItem {
    pub content_type: String,
    pub title: String,
    pub creator_id: Option<DbId>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub parent_group_id: Option<DbId>,
    #[serde(default)]
    pub is_tmp: bool,
    /// Workflow state; defaults to `"public"` when absent.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub publish_from: Option<Timestamp>,
    #[serde(default)]
    pub publish_to: Option<Timestamp>,
    #[serde(default)]
    pub remove_after_publish_to: bool,
}

impl CreateContentItem {
    /// Validate the input-layer invariants: non-empty bounded title and an
    /// ordered publish window.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.title.len() > MAX_TITLE_LENGTH {
            return Err(format!(
                "title exceeds maximum length of {MAX_TITLE_LENGTH}"
            ));
        }
        PublishWindow::new(self.publish_from, self.publish_to).validate()
    }

    /// Effective workflow state for the insert.
    pub fn state_or_default(&self) -> &str {
        self.state.as_deref().unwrap_or(states::PUBLIC)
    }
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// DTO for patching a content item. `None` leaves a column untouched; the
/// publish window is changed through `ContentRepo::set_publish_window`,
/// which can also clear a bound.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContentItem {
    pub title: Option<String>,
    pub keywords: Option<String>,
    pub state: Option<String>,
    pub is_tmp: Option<bool>,
    pub changed_by_id: Option<DbId>,
    pub remove_after_publish_to: Option<bool>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
