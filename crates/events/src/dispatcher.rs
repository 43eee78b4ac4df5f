//! Lifecycle dispatcher.
//!
//! [`Dispatcher::handle_saved`] is the post-commit save hook: it logs the
//! unconditional `created`/`changed` entry, re-evaluates publish
//! eligibility, and consults the history log to decide whether a
//! `published`/`unpublished` transition fires. The log entry written for a
//! transition is the idempotence guard — a repeat save with unchanged
//! eligibility finds the matching lifecycle entry and emits nothing.
//!
//! Listeners registered via [`Dispatcher::add_listener`] run inline and in
//! order before the transition is recorded, so a listener may delete the
//! entity as a side effect (the unpublish logger checks existence and
//! no-ops in that case). Passive observers subscribe to the bus instead.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use atrium_core::content::ContentSnapshot;
use atrium_core::history::{HistoryStatus, SubjectRef};
use atrium_core::publish::{next_transition, Transition};
use atrium_core::store::{ContentStore, HistoryLog, StoreError};
use atrium_core::types::Timestamp;

use crate::bus::{ContentEvent, EventBus, EventKind};

// ---------------------------------------------------------------------------
// DispatchError
// ---------------------------------------------------------------------------

/// Error raised when a store operation inside the dispatcher fails.
///
/// Listener failures are not represented here — they are logged and the
/// transition proceeds.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// LifecycleListener
// ---------------------------------------------------------------------------

/// A side-effecting subscriber invoked inline for every emitted event.
#[async_trait]
pub trait LifecycleListener: Send + Sync {
    /// Listener name used in log output.
    fn name(&self) -> &'static str;

    async fn on_event(&self, event: &ContentEvent) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Turns entity saves and deletes into lifecycle events.
pub struct Dispatcher {
    history: Arc<dyn HistoryLog>,
    content: Arc<dyn ContentStore>,
    listeners: Vec<Arc<dyn LifecycleListener>>,
    bus: EventBus,
}

impl Dispatcher {
    pub fn new(history: Arc<dyn HistoryLog>, content: Arc<dyn ContentStore>) -> Self {
        Self {
            history,
            content,
            listeners: Vec::new(),
            bus: EventBus::default(),
        }
    }

    /// Register an inline listener. Listeners run in registration order.
    pub fn add_listener(&mut self, listener: Arc<dyn LifecycleListener>) {
        self.listeners.push(listener);
    }

    /// The fan-out bus for passive observers.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Process an entity save.
    ///
    /// `snapshot` is the post-commit row state, `now` the evaluation
    /// instant (injected for determinism), `is_new` whether this was the
    /// first save. Store failures propagate; nothing is retried.
    pub async fn handle_saved(
        &self,
        snapshot: &ContentSnapshot,
        now: Timestamp,
        is_new: bool,
    ) -> Result<(), DispatchError> {
        let subject = &snapshot.subject;

        // Every save leaves exactly one created/changed entry, independent
        // of the publish state machine.
        if is_new {
            self.history
                .log(subject, HistoryStatus::Created, snapshot.creator_id, "")
                .await?;
            self.emit(ContentEvent::new(EventKind::Created, snapshot.clone(), now))
                .await;
        } else {
            self.history
                .log(subject, HistoryStatus::Changed, snapshot.changed_by_id, "")
                .await?;
            self.emit(ContentEvent::new(EventKind::Changed, snapshot.clone(), now))
                .await;
        }

        let eligible =
            snapshot.is_publish_eligible(now) && self.content.exists(subject).await?;

        let last = self
            .history
            .get_last(subject, &HistoryStatus::LIFECYCLE)
            .await?
            .map(|record| record.status);

        match next_transition(eligible, last) {
            Some(Transition::Publish { first_edition }) => {
                self.emit(ContentEvent::new(
                    EventKind::Published { first_edition },
                    snapshot.clone(),
                    now,
                ))
                .await;

                self.history
                    .log(subject, HistoryStatus::Published, snapshot.changed_by_id, "")
                    .await?;
                self.content
                    .mark_notified(subject, Some(true), Some(false))
                    .await?;

                tracing::info!(subject = %subject, first_edition, "Content published");
            }
            Some(Transition::Unpublish) => {
                self.emit(ContentEvent::new(
                    EventKind::Unpublished,
                    snapshot.clone(),
                    now,
                ))
                .await;

                self.content
                    .mark_notified(subject, None, Some(true))
                    .await?;

                // A listener may have removed the entity; logging the
                // transition for a vanished row is a no-op.
                if self.content.exists(subject).await? {
                    self.history
                        .log(
                            subject,
                            HistoryStatus::Unpublished,
                            snapshot.changed_by_id,
                            "",
                        )
                        .await?;
                }

                tracing::info!(subject = %subject, "Content unpublished");
            }
            None => {}
        }

        Ok(())
    }

    /// Process an entity deletion: drop its history.
    pub async fn handle_deleted(&self, subject: &SubjectRef) -> Result<u64, DispatchError> {
        let removed = self.history.delete_for(subject).await?;
        tracing::debug!(subject = %subject, removed, "Cleared history for deleted entity");
        Ok(removed)
    }

    /// Run the inline listeners, then fan out to the bus.
    async fn emit(&self, event: ContentEvent) {
        for listener in &self.listeners {
            if let Err(e) = listener.on_event(&event).await {
                tracing::error!(
                    listener = listener.name(),
                    event = event.kind.name(),
                    subject = %event.snapshot.subject,
                    error = %e,
                    "Lifecycle listener failed"
                );
            }
        }
        self.bus.publish(event);
    }
}
