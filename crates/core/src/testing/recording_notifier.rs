//! Notifier that records messages for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::notify::{Notifier, NotifyError};

/// Captures every message it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Arc<RwLock<Vec<String>>>,
    attempts: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingNotifier {
    /// Create a notifier that accepts every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a notifier whose transport always fails.
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.failing.store(true, Ordering::SeqCst);
        notifier
    }

    /// Messages delivered so far, in delivery order.
    pub async fn messages(&self) -> Vec<String> {
        self.messages.read().await.clone()
    }

    /// Delivered messages starting with `prefix`.
    pub async fn messages_starting_with(&self, prefix: &str) -> Vec<String> {
        self.messages
            .read()
            .await
            .iter()
            .filter(|m| m.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Number of send calls, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Transport("mock: connection refused".to_string()));
        }
        self.messages.write().await.push(text.to_string());
        Ok(())
    }
}
