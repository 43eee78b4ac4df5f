//! Periodic publication sweep.
//!
//! User edits trigger the dispatcher directly; windows that open or close
//! with no edit in sight do not. [`PublishSweep`] closes that gap: on an
//! interval it re-dispatches every row whose `publish_from` has just
//! elapsed or whose `publish_to` has just passed, and removes expired rows
//! flagged `remove_after_publish_to`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use atrium_core::types::Timestamp;
use atrium_db::repositories::ContentRepo;
use atrium_db::DbPool;

use crate::dispatcher::Dispatcher;

/// Default seconds between sweep passes.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

// ---------------------------------------------------------------------------
// SweepConfig
// ---------------------------------------------------------------------------

/// Sweep configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Interval between passes (default: 300 s).
    pub interval: Duration,
}

impl SweepConfig {
    /// Load from `SWEEP_INTERVAL_SECS`, falling back to the default.
    pub fn from_env() -> Self {
        let secs: u64 = std::env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);

        Self {
            interval: Duration::from_secs(secs),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

// ---------------------------------------------------------------------------
// SweepStats
// ---------------------------------------------------------------------------

/// Counts of what a single pass touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepStats {
    pub published: usize,
    pub unpublished: usize,
    pub removed: usize,
}

impl SweepStats {
    pub fn is_empty(&self) -> bool {
        self.published == 0 && self.unpublished == 0 && self.removed == 0
    }
}

// ---------------------------------------------------------------------------
// PublishSweep
// ---------------------------------------------------------------------------

/// Background service that re-evaluates publish windows on an interval.
pub struct PublishSweep {
    pool: DbPool,
    dispatcher: Arc<Dispatcher>,
    interval: Duration,
}

impl PublishSweep {
    pub fn new(pool: DbPool, dispatcher: Arc<Dispatcher>, config: SweepConfig) -> Self {
        Self {
            pool,
            dispatcher,
            interval: config.interval,
        }
    }

    /// Run the sweep loop.
    ///
    /// Processes a pass per interval tick. The loop exits gracefully when
    /// the provided [`CancellationToken`] is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Publication sweep cancelled");
                    break;
                }
                _ = interval.tick() => {
                    match self.process(Utc::now()).await {
                        Ok(stats) if !stats.is_empty() => {
                            tracing::info!(
                                published = stats.published,
                                unpublished = stats.unpublished,
                                removed = stats.removed,
                                "Publication sweep completed"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::error!(error = %e, "Publication sweep failed");
                        }
                    }
                }
            }
        }
    }

    /// Run one sweep pass at the given instant.
    ///
    /// Re-dispatching an item is a plain save replay: the dispatcher logs
    /// `changed` and works out the due transition itself. Per-item dispatch
    /// failures are logged and the pass continues; query failures abort the
    /// pass.
    pub async fn process(&self, now: Timestamp) -> Result<SweepStats, sqlx::Error> {
        let mut stats = SweepStats::default();

        // Windows that opened since the last pass.
        for item in ContentRepo::due_for_publish(&self.pool, now).await? {
            match self.dispatcher.handle_saved(&item.snapshot(), now, false).await {
                Ok(()) => stats.published += 1,
                Err(e) => {
                    tracing::error!(
                        subject = %item.subject(),
                        error = %e,
                        "Failed to re-dispatch due publication"
                    );
                }
            }
        }

        // Windows that closed (or were pushed into the future).
        for item in ContentRepo::due_for_unpublish(&self.pool, now).await? {
            let subject = item.subject();

            // Keep the row out of the next pass even when no transition
            // fires, and arm it for a later re-publication.
            ContentRepo::mark_notified(&self.pool, &subject, Some(false), Some(true)).await?;

            match self.dispatcher.handle_saved(&item.snapshot(), now, false).await {
                Ok(()) => stats.unpublished += 1,
                Err(e) => {
                    tracing::error!(
                        subject = %subject,
                        error = %e,
                        "Failed to re-dispatch due unpublication"
                    );
                }
            }
        }

        // Tenacious content: expired and flagged for removal.
        for item in ContentRepo::due_for_removal(&self.pool, now).await? {
            let subject = item.subject();

            if ContentRepo::delete(&self.pool, &subject).await? {
                if let Err(e) = self.dispatcher.handle_deleted(&subject).await {
                    tracing::error!(
                        subject = %subject,
                        error = %e,
                        "Failed to clear history for removed content"
                    );
                }
                stats.removed += 1;
            }
        }

        Ok(stats)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_five_minutes() {
        assert_eq!(
            SweepConfig::default().interval,
            Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS)
        );
    }

    #[test]
    fn empty_stats_report_empty() {
        assert!(SweepStats::default().is_empty());
        let stats = SweepStats {
            published: 1,
            ..Default::default()
        };
        assert!(!stats.is_empty());
    }
}
