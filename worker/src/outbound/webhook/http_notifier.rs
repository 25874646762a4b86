//! Reqwest-backed webhook notifier.
//!
//! Posts `{"text": ...}` once per call. Anything other than a 2xx answer is a
//! delivery failure; nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::warn;

use crate::domain::WebhookUrl;
use crate::domain::ports::{Notifier, NotifierError};

const USER_AGENT: &str = concat!("relayboard-worker/", env!("CARGO_PKG_VERSION"));
const BODY_PREVIEW_CHARS: usize = 120;

#[derive(Serialize)]
struct WebhookMessage<'a> {
    text: &'a str,
}

/// Notifier posting JSON text messages to incoming-webhook URLs.
#[derive(Debug, Clone)]
pub struct WebhookHttpNotifier {
    client: Client,
}

impl WebhookHttpNotifier {
    /// Build a notifier whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Notifier for WebhookHttpNotifier {
    async fn post_text(&self, webhook: &WebhookUrl, text: &str) -> Result<(), NotifierError> {
        let response = self
            .client
            .post(webhook.as_url().clone())
            .json(&WebhookMessage { text })
            .send()
            .await
            .map_err(|err| NotifierError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        warn!(
            status = status.as_u16(),
            body = %body_preview(&body),
            "webhook rejected dispatch"
        );
        Err(NotifierError::status(status.as_u16()))
    }
}

fn body_preview(body: &str) -> String {
    body.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(BODY_PREVIEW_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serialises_as_text_object() {
        let value = serde_json::to_value(WebhookMessage { text: "hi" }).expect("json");
        assert_eq!(value, serde_json::json!({"text": "hi"}));
    }

    #[test]
    fn body_preview_compacts_whitespace() {
        assert_eq!(body_preview("invalid_payload\n\n  channel_not_found"), "invalid_payload channel_not_found");
        assert_eq!(body_preview(&"x".repeat(500)).len(), BODY_PREVIEW_CHARS);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let notifier = WebhookHttpNotifier::new(Duration::from_millis(500)).expect("client");
        let webhook = WebhookUrl::parse_optional(Some("http://127.0.0.1:9/hook"))
            .expect("valid")
            .expect("present");
        let err = notifier
            .post_text(&webhook, "hello")
            .await
            .expect_err("nothing listens on the discard port");
        assert!(matches!(err, NotifierError::Transport { .. }), "{err:?}");
    }
}
