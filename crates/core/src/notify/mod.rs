//! Notifications about individual files and about the whole batch.
//!
//! Workers raise [`Notification`] events through a cloneable
//! [`NotificationHandle`]. A single [`NotificationWriter`] task renders each
//! event and hands it to a [`Notifier`], so every message reaches the
//! transport whole and one at a time. Transport failures are logged and
//! otherwise ignored.

mod events;
mod handle;
mod log;
mod traits;
mod webhook;
mod writer;

pub use events::*;
pub use handle::*;
pub use log::LogNotifier;
pub use traits::{Notifier, NotifyError};
pub use webhook::WebhookNotifier;
pub use writer::*;
