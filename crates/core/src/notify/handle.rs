use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::Notification;

/// Envelope wrapping a notification with the time it was raised
#[derive(Debug, Clone)]
pub struct NotificationEnvelope {
    pub timestamp: DateTime<Utc>,
    pub notification: Notification,
}

/// Handle for emitting notifications
///
/// This is cheaply cloneable and can be shared across tasks.
/// Notifications are sent through an async channel to be delivered by the
/// NotificationWriter.
#[derive(Clone)]
pub struct NotificationHandle {
    tx: mpsc::Sender<NotificationEnvelope>,
}

impl NotificationHandle {
    /// Create a new notification handle from a channel sender
    pub fn new(tx: mpsc::Sender<NotificationEnvelope>) -> Self {
        Self { tx }
    }

    /// Emit a notification
    ///
    /// Waits for channel capacity. If the channel is closed, the error is
    /// logged but the caller is not failed.
    pub async fn emit(&self, notification: Notification) {
        let envelope = NotificationEnvelope {
            timestamp: Utc::now(),
            notification,
        };
        if let Err(e) = self.tx.send(envelope).await {
            tracing::error!(
                event_type = e.0.notification.event_type(),
                "Failed to queue notification: channel closed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_emit_notification() {
        let (tx, mut rx) = mpsc::channel(10);
        let handle = NotificationHandle::new(tx);

        handle
            .emit(Notification::MetadataNotEstimable {
                path: PathBuf::from("/music/a.wav"),
            })
            .await;

        let envelope = rx.recv().await.expect("Should receive notification");
        assert!(envelope.timestamp <= Utc::now());
        assert!(matches!(
            envelope.notification,
            Notification::MetadataNotEstimable { .. }
        ));
    }

    #[tokio::test]
    async fn test_multiple_handles_same_channel() {
        let (tx, mut rx) = mpsc::channel(10);
        let handle1 = NotificationHandle::new(tx.clone());
        let handle2 = NotificationHandle::new(tx);

        handle1
            .emit(Notification::MetadataNotEstimable {
                path: PathBuf::from("/a.wav"),
            })
            .await;
        handle2
            .emit(Notification::MetadataCopyFailed {
                path: PathBuf::from("/b.wav"),
                reason: "test".to_string(),
            })
            .await;

        let e1 = rx.recv().await.expect("Should receive first notification");
        let e2 = rx.recv().await.expect("Should receive second notification");
        assert_eq!(e1.notification.event_type(), "metadata_not_estimable");
        assert_eq!(e2.notification.event_type(), "metadata_copy_failed");
    }

    #[tokio::test]
    async fn test_emit_closed_channel() {
        let (tx, rx) = mpsc::channel::<NotificationEnvelope>(10);
        let handle = NotificationHandle::new(tx);
        drop(rx);

        // Must not panic
        handle
            .emit(Notification::MetadataNotEstimable {
                path: PathBuf::from("/a.wav"),
            })
            .await;
    }
}
