//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the fan-out side of the lifecycle: passive observers
//! (notification delivery, search indexing, timelines) subscribe here, while
//! side-effecting listeners register directly on the dispatcher.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use atrium_core::content::ContentSnapshot;
use atrium_core::history::SubjectRef;
use atrium_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// Kind of lifecycle event.
///
/// `Created`/`Changed` fire exactly once per save; `Published`/`Unpublished`
/// fire at most once per actual transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EventKind {
    Created,
    Changed,
    Published {
        /// Set when the entity has never been published before.
        first_edition: bool,
    },
    Unpublished,
}

impl EventKind {
    /// Short name for log output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Changed => "changed",
            Self::Published { .. } => "published",
            Self::Unpublished => "unpublished",
        }
    }
}

// ---------------------------------------------------------------------------
// ContentEvent
// ---------------------------------------------------------------------------

/// A lifecycle event carrying the full entity snapshot, so subscribers can
/// act without a storage round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEvent {
    pub kind: EventKind,
    pub snapshot: ContentSnapshot,
    /// The user the event is attributed to: the creator for `Created`,
    /// the last modifier for everything else.
    pub actor_id: Option<DbId>,
    /// When the triggering save was evaluated (injected, not wall-clock).
    pub timestamp: Timestamp,
}

impl ContentEvent {
    /// Create an event for a snapshot, picking the actor by kind.
    pub fn new(kind: EventKind, snapshot: ContentSnapshot, timestamp: Timestamp) -> Self {
        let actor_id = match kind {
            EventKind::Created => snapshot.creator_id,
            _ => snapshot.changed_by_id,
        };
        Self {
            kind,
            snapshot,
            actor_id,
            timestamp,
        }
    }

    /// Override the attributed actor.
    pub fn with_actor(mut self, actor_id: DbId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// The subject the event is about.
    pub fn subject(&self) -> &SubjectRef {
        &self.snapshot.subject
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ContentEvent`].
pub struct EventBus {
    sender: broadcast::Sender<ContentEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// the history log, not the bus, is the durable record.
    pub fn publish(&self, event: ContentEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ContentEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
