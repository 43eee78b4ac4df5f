//! Publish-window evaluation and the lifecycle transition table.
//!
//! [`evaluate`] is a pure function of `(now, window, is_tmp)`; all callers
//! inject `now` so results are deterministic and testable at the boundary
//! instants. [`next_transition`] decides which lifecycle event (if any) a
//! save should emit, given the entity's current eligibility and its most
//! recent lifecycle history entry.

use serde::{Deserialize, Serialize};

use crate::history::HistoryStatus;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// PublishState
// ---------------------------------------------------------------------------

/// State strings for reporting and serialization.
pub mod state_values {
    pub const PUBLISHED: &str = "published";
    pub const SCHEDULED: &str = "scheduled";
    pub const UNPUBLISHED: &str = "unpublished";
}

/// Evaluated publish state of an entity at a given instant.
///
/// `Scheduled` is a reporting sub-case of "not published" (the window opens
/// in the future); the lifecycle dispatcher treats it the same as
/// `Unpublished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishState {
    Published,
    Scheduled,
    Unpublished,
}

impl PublishState {
    /// Convert to the reporting string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published => state_values::PUBLISHED,
            Self::Scheduled => state_values::SCHEDULED,
            Self::Unpublished => state_values::UNPUBLISHED,
        }
    }
}

// ---------------------------------------------------------------------------
// PublishWindow
// ---------------------------------------------------------------------------

/// The optional visibility window of a content entity.
///
/// Absent bounds mean an open interval: no `publish_from` publishes
/// immediately, no `publish_to` publishes forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishWindow {
    pub publish_from: Option<Timestamp>,
    pub publish_to: Option<Timestamp>,
}

impl PublishWindow {
    pub fn new(publish_from: Option<Timestamp>, publish_to: Option<Timestamp>) -> Self {
        Self {
            publish_from,
            publish_to,
        }
    }

    /// A window with no bounds: always published.
    pub fn always() -> Self {
        Self::default()
    }

    /// Validate the window ordering invariant.
    ///
    /// When both bounds are set, `publish_from` must not be later than
    /// `publish_to`. This is an input-validation rule; the evaluator itself
    /// accepts any window.
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(from), Some(to)) = (self.publish_from, self.publish_to) {
            if from > to {
                return Err(format!(
                    "publish_from ({from}) must not be later than publish_to ({to})"
                ));
            }
        }
        Ok(())
    }

    /// Evaluate this window at `now`. See [`evaluate`].
    pub fn state(&self, now: Timestamp, is_tmp: bool) -> PublishState {
        evaluate(now, self, is_tmp)
    }

    /// Whether the window is open at `now` (and the entity is not temporary).
    pub fn is_published(&self, now: Timestamp, is_tmp: bool) -> bool {
        self.state(now, is_tmp) == PublishState::Published
    }

    /// Whether the window opens in the future (and has not already closed).
    pub fn is_scheduled(&self, now: Timestamp, is_tmp: bool) -> bool {
        self.state(now, is_tmp) == PublishState::Scheduled
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate the publish state of an entity at a given instant.
///
/// - a temporary entity is never published;
/// - a `publish_to` at or before `now` means the window has closed
///   (the upper bound is strict: `publish_to == now` is already expired);
/// - a `publish_from` after `now` means the window has not opened yet;
/// - otherwise the entity is published. Absent bounds default to an open
///   interval.
///
/// Pure and side-effect free; callable at arbitrary rate.
pub fn evaluate(now: Timestamp, window: &PublishWindow, is_tmp: bool) -> PublishState {
    if is_tmp {
        return PublishState::Unpublished;
    }

    if let Some(to) = window.publish_to {
        if to <= now {
            return PublishState::Unpublished;
        }
    }

    if let Some(from) = window.publish_from {
        if from > now {
            return PublishState::Scheduled;
        }
    }

    PublishState::Published
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// A lifecycle event the dispatcher should emit for a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The entity becomes published. `first_edition` is set when the entity
    /// has no publish history at all.
    Publish { first_edition: bool },
    /// The entity leaves the published state.
    Unpublish,
}

/// Decide the lifecycle transition for a save.
///
/// `last` is the entity's most recent `published`/`unpublished` history
/// entry, or `None` if it has never been through the lifecycle. A missing or
/// corrupt history (no lifecycle entries) safely degrades to "first
/// publication". Non-lifecycle statuses passed as `last` are treated the
/// same as `None`.
///
/// Repeated saves with no eligibility change yield `None` — at most one
/// publish and one unpublish fire per actual transition.
pub fn next_transition(eligible: bool, last: Option<HistoryStatus>) -> Option<Transition> {
    let last_lifecycle = last.filter(|s| HistoryStatus::LIFECYCLE.contains(s));

    if eligible {
        match last_lifecycle {
            None => Some(Transition::Publish {
                first_edition: true,
            }),
            Some(HistoryStatus::Unpublished) => Some(Transition::Publish {
                first_edition: false,
            }),
            _ => None,
        }
    } else {
        match last_lifecycle {
            Some(HistoryStatus::Published) => Some(Transition::Unpublish),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
