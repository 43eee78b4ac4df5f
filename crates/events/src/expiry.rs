//! Expiry cleanup listener.
//!
//! Content flagged `remove_after_publish_to` is deleted as soon as it is
//! unpublished past its window. Runs inline on the dispatcher, before the
//! `unpublished` transition is logged — the dispatcher's existence check
//! then skips the log entry for the removed row.

use std::sync::Arc;

use async_trait::async_trait;

use atrium_core::store::{ContentStore, StoreError};

use crate::bus::{ContentEvent, EventKind};
use crate::dispatcher::LifecycleListener;

/// Deletes expired content on unpublish.
pub struct ExpiryListener {
    content: Arc<dyn ContentStore>,
}

impl ExpiryListener {
    pub fn new(content: Arc<dyn ContentStore>) -> Self {
        Self { content }
    }
}

#[async_trait]
impl LifecycleListener for ExpiryListener {
    fn name(&self) -> &'static str {
        "expiry"
    }

    async fn on_event(&self, event: &ContentEvent) -> Result<(), StoreError> {
        if !matches!(event.kind, EventKind::Unpublished) {
            return Ok(());
        }

        let snapshot = &event.snapshot;
        if !snapshot.remove_after_publish_to {
            return Ok(());
        }

        let Some(publish_to) = snapshot.window.publish_to else {
            return Ok(());
        };

        if publish_to < event.timestamp {
            let removed = self.content.delete(&snapshot.subject).await?;
            if removed {
                tracing::info!(
                    subject = %snapshot.subject,
                    "Removed content after its publish window closed"
                );
            }
        }

        Ok(())
    }
}
