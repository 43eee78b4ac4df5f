//! Content snapshots, metadata normalization, and visibility rules.
//!
//! A [`ContentSnapshot`] is the lifecycle dispatcher's view of an entity:
//! the persistence layer builds one from a freshly saved row and hands it
//! over together with an injected `now`.

use serde::{Deserialize, Serialize};

use crate::history::SubjectRef;
use crate::publish::{PublishState, PublishWindow};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Workflow state names with special meaning to the lifecycle.
pub mod states {
    /// Content in this state is invisible regardless of its publish window.
    pub const PRIVATE: &str = "private";
    /// Default workflow state for new content.
    pub const PUBLIC: &str = "public";
}

/// Maximum number of user keywords kept per entity.
pub const MAX_KEYWORDS: usize = 10;

/// Maximum title length, matching the `content_items.title` column.
pub const MAX_TITLE_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Keyword handling
// ---------------------------------------------------------------------------

/// Normalize a raw comma-separated keyword string for storage.
///
/// Strips single quotes, keeps at most [`MAX_KEYWORDS`] entries, trims each
/// entry, and re-joins with commas.
pub fn normalize_keywords(raw: &str) -> String {
    let cleaned = raw.replace('\'', "");
    cleaned
        .split(',')
        .take(MAX_KEYWORDS)
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a stored keyword string for display. Empty input yields no entries.
pub fn keyword_list(keywords: &str) -> Vec<String> {
    if keywords.is_empty() {
        return Vec::new();
    }
    keywords.split(',').map(String::from).collect()
}

// ---------------------------------------------------------------------------
// Slugs and cache keys
// ---------------------------------------------------------------------------

/// Build a URL slug from a title: lowercase alphanumeric runs joined by `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Cache key for an entity, flat enough for any cache backend.
pub fn cache_key(subject: &SubjectRef) -> String {
    format!("{}_{}", subject.content_type.replace('.', "_"), subject.id)
}

// ---------------------------------------------------------------------------
// ContentSnapshot
// ---------------------------------------------------------------------------

/// Point-in-time view of a persisted content entity.
///
/// Snapshots only exist for rows that made it to storage; an entity that was
/// never saved has no snapshot and is never public.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    pub subject: SubjectRef,
    pub title: String,
    pub is_tmp: bool,
    /// Workflow state name; `"private"` suppresses publication.
    pub state: String,
    pub window: PublishWindow,
    pub remove_after_publish_to: bool,
    pub creator_id: Option<DbId>,
    pub changed_by_id: Option<DbId>,
}

impl ContentSnapshot {
    /// Evaluated publish state at `now`.
    pub fn publish_state(&self, now: Timestamp) -> PublishState {
        self.window.state(now, self.is_tmp)
    }

    /// Whether the publish window is open at `now`.
    pub fn is_published(&self, now: Timestamp) -> bool {
        self.window.is_published(now, self.is_tmp)
    }

    /// Whether publication is pending a future `publish_from`.
    pub fn is_scheduled(&self, now: Timestamp) -> bool {
        self.window.is_scheduled(now, self.is_tmp)
    }

    /// Whether this entity should currently generate publish events.
    ///
    /// Closed-group membership is deliberately not consulted: content placed
    /// in a closed group still publishes, its audience is narrowed by access
    /// control. The dispatcher additionally requires the row to still exist.
    pub fn is_publish_eligible(&self, now: Timestamp) -> bool {
        self.is_published(now) && self.state != states::PRIVATE
    }

    /// Canonical public-visibility predicate.
    ///
    /// True iff the entity is not temporary, not in a closed group, not in
    /// the private state, and its publish window is open at `now`.
    /// `in_closed_group` is supplied by the access-control collaborator.
    pub fn is_public(&self, in_closed_group: bool, now: Timestamp) -> bool {
        !self.is_tmp
            && !in_closed_group
            && self.state != states::PRIVATE
            && self.is_published(now)
    }

    /// URL slug derived from the title.
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    /// Cache key for this entity.
    pub fn cache_key(&self) -> String {
        cache_key(&self.subject)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
