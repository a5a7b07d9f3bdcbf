use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use super::{Notifier, NotificationEnvelope, NotificationHandle};

/// Background task that receives notifications and delivers them one at a time
pub struct NotificationWriter {
    rx: mpsc::Receiver<NotificationEnvelope>,
    notifier: Arc<dyn Notifier>,
}

impl NotificationWriter {
    /// Create a new notification writer
    pub fn new(rx: mpsc::Receiver<NotificationEnvelope>, notifier: Arc<dyn Notifier>) -> Self {
        Self { rx, notifier }
    }

    /// Run the writer, consuming notifications until every handle is dropped
    ///
    /// This should be spawned as a background task. Returns the number of
    /// messages delivered successfully.
    pub async fn run(mut self) -> usize {
        tracing::debug!(notifier = self.notifier.name(), "Notification writer started");
        let mut delivered = 0;

        while let Some(envelope) = self.rx.recv().await {
            let text = envelope.notification.render();
            let queued_ms = queued_for(&envelope).num_milliseconds();
            match self.notifier.send(&text).await {
                Ok(()) => {
                    delivered += 1;
                    tracing::debug!(
                        event_type = envelope.notification.event_type(),
                        queued_ms,
                        "Notification delivered"
                    );
                }
                Err(e) => tracing::warn!(
                    notifier = self.notifier.name(),
                    event_type = envelope.notification.event_type(),
                    raised_at = %envelope.timestamp.to_rfc3339(),
                    queued_ms,
                    error = %e,
                    "Failed to deliver notification"
                ),
            }
        }

        tracing::debug!(delivered, "Notification writer shutting down");
        delivered
    }
}

/// Time between raising a notification and handing it to the transport.
fn queued_for(envelope: &NotificationEnvelope) -> chrono::Duration {
    (Utc::now() - envelope.timestamp).max(chrono::Duration::zero())
}

/// Create a complete notification system
///
/// Returns:
/// - `NotificationHandle` - for emitting notifications (clone this to share across tasks)
/// - `NotificationWriter` - spawn this as a background task with `tokio::spawn(writer.run())`
///
/// # Arguments
/// * `notifier` - The transport messages are delivered through
/// * `buffer_size` - Size of the channel buffer (emitters wait if full)
pub fn create_notification_system(
    notifier: Arc<dyn Notifier>,
    buffer_size: usize,
) -> (NotificationHandle, NotificationWriter) {
    let (tx, rx) = mpsc::channel(buffer_size.max(1));
    let handle = NotificationHandle::new(tx);
    let writer = NotificationWriter::new(rx, notifier);
    (handle, writer)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use crate::notify::Notification;
    use crate::testing::RecordingNotifier;

    #[tokio::test]
    async fn test_writer_delivers_rendered_text() {
        let notifier = Arc::new(RecordingNotifier::new());
        let (handle, writer) = create_notification_system(notifier.clone(), 10);
        let writer_task = tokio::spawn(writer.run());

        handle
            .emit(Notification::MetadataNotEstimable {
                path: PathBuf::from("/music/track01.wav"),
            })
            .await;
        handle
            .emit(Notification::BatchCompleted {
                converted: 1,
                total_bytes_saved: 0,
                duration: Duration::from_secs(2),
            })
            .await;
        drop(handle);

        let delivered = writer_task.await.unwrap();
        assert_eq!(delivered, 2);

        let messages = notifier.messages().await;
        assert_eq!(
            messages[0],
            "Could not estimate metadata for /music/track01.wav. Please check manually."
        );
        assert!(messages[1].starts_with("Audio Conversion Completed!"));
    }

    #[tokio::test]
    async fn test_writer_survives_transport_failures() {
        let notifier = Arc::new(RecordingNotifier::failing());
        let (handle, writer) = create_notification_system(notifier.clone(), 10);
        let writer_task = tokio::spawn(writer.run());

        for i in 0..3 {
            handle
                .emit(Notification::MetadataNotEstimable {
                    path: PathBuf::from(format!("/{}.wav", i)),
                })
                .await;
        }
        drop(handle);

        assert_eq!(writer_task.await.unwrap(), 0);
        assert_eq!(notifier.attempts(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_emitters_deliver_whole_messages() {
        let notifier = Arc::new(RecordingNotifier::new());
        let (handle, writer) = create_notification_system(notifier.clone(), 4);
        let writer_task = tokio::spawn(writer.run());

        let mut emitters = Vec::new();
        for i in 0..20 {
            let handle = handle.clone();
            emitters.push(tokio::spawn(async move {
                handle
                    .emit(Notification::MetadataEstimated {
                        path: PathBuf::from(format!("/music/A{i} - T{i}.wav")),
                        artist: format!("A{i}"),
                        title: format!("T{i}"),
                    })
                    .await;
            }));
        }
        for emitter in emitters {
            emitter.await.unwrap();
        }
        drop(handle);
        writer_task.await.unwrap();

        let mut messages = notifier.messages().await;
        assert_eq!(messages.len(), 20);
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), 20);
        assert!(messages
            .iter()
            .all(|m| m.starts_with("Estimated metadata for /music/A")));
    }

    #[test]
    fn test_queue_time_measured_from_timestamp() {
        let envelope = NotificationEnvelope {
            timestamp: Utc::now() - chrono::Duration::milliseconds(1500),
            notification: Notification::MetadataNotEstimable {
                path: PathBuf::from("/a.wav"),
            },
        };
        assert!(queued_for(&envelope).num_milliseconds() >= 1500);

        let future = NotificationEnvelope {
            timestamp: Utc::now() + chrono::Duration::seconds(60),
            notification: envelope.notification.clone(),
        };
        assert_eq!(queued_for(&future), chrono::Duration::zero());
    }
}
