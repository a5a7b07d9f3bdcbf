use async_trait::async_trait;

use super::traits::{Notifier, NotifyError};

/// Notifier used when no webhook is configured; writes messages to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        tracing::info!(target: "camps::notification", "{}", text);
        Ok(())
    }
}
