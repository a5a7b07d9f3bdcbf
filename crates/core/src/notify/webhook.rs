//! Incoming-webhook notifier (Slack-compatible payload).

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::traits::{Notifier, NotifyError};

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Posts each message as `{"text": ...}` to a webhook URL.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text })
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                status: status.as_u16(),
            });
        }

        debug!("Webhook notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accepts one request, answers with `status_line` and returns the raw request.
    async fn one_shot_server(status_line: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!("{}\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok", status_line);
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });

        (url, handle)
    }

    #[tokio::test]
    async fn test_send_posts_text_payload() {
        let (url, server) = one_shot_server("HTTP/1.1 200 OK").await;
        let notifier = WebhookNotifier::new(url, Duration::from_secs(5)).unwrap();

        notifier.send("Files Converted: 2").await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /hook"));
        assert!(request.contains(r#"{"text":"Files Converted: 2"}"#));
    }

    #[tokio::test]
    async fn test_send_non_success_status() {
        let (url, server) = one_shot_server("HTTP/1.1 500 Internal Server Error").await;
        let notifier = WebhookNotifier::new(url, Duration::from_secs(5)).unwrap();

        let result = notifier.send("hello").await;
        assert!(matches!(result, Err(NotifyError::Status { status: 500 })));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_unreachable() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let notifier =
            WebhookNotifier::new(format!("http://{}/hook", addr), Duration::from_secs(2)).unwrap();
        let result = notifier.send("hello").await;
        assert!(matches!(result, Err(NotifyError::Transport(_))));
    }
}
