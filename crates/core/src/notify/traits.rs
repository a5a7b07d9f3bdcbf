use async_trait::async_trait;
use thiserror::Error;

/// Errors from a notification transport. Logged by the caller, never propagated.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Webhook returned HTTP {status}")]
    Status { status: u16 },
}

/// Destination for human-readable notification text.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Returns the name of this notifier implementation.
    fn name(&self) -> &str;

    /// Delivers one complete message.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}
