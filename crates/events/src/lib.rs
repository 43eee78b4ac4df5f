//! Atrium lifecycle event infrastructure.
//!
//! This crate turns entity saves and deletes into at-most-once lifecycle
//! events:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ContentEvent`] — the typed lifecycle event envelope.
//! - [`Dispatcher`] — the save/delete hook that compares evaluated publish
//!   state against the history log and emits transitions.
//! - [`ExpiryListener`] — removes content flagged `remove_after_publish_to`
//!   once its window has closed.
//! - [`PublishSweep`] — periodic service re-dispatching entities whose
//!   window bounds have just elapsed.

pub mod bus;
pub mod dispatcher;
pub mod expiry;
pub mod sweep;

pub use bus::{ContentEvent, EventBus, EventKind};
pub use dispatcher::{DispatchError, Dispatcher, LifecycleListener};
pub use expiry::ExpiryListener;
pub use sweep::{PublishSweep, SweepConfig, SweepStats};
