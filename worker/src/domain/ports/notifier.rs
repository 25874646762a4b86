//! Driven port posting text messages to a chat webhook.

use std::sync::Mutex;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::WebhookUrl;

define_port_error! {
    /// Errors raised while posting a message.
    pub enum NotifierError {
        /// The request never completed.
        Transport {
            /// Client error text.
            message: String,
        } => "webhook transport failed: {message}",
        /// The webhook answered with a non-success status.
        Status {
            /// HTTP status code.
            code: u16,
        } => "webhook returned status {code}",
    }
}

/// Port delivering one text message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post `text` to `webhook`.
    async fn post_text(&self, webhook: &WebhookUrl, text: &str) -> Result<(), NotifierError>;
}

/// Fixture recording every message it is asked to post.
#[derive(Debug, Default)]
pub struct FixtureNotifier {
    sent: Mutex<Vec<String>>,
}

impl FixtureNotifier {
    /// Messages posted so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for FixtureNotifier {
    async fn post_text(&self, _webhook: &WebhookUrl, text: &str) -> Result<(), NotifierError> {
        self.sent
            .lock()
            .map_err(|err| NotifierError::transport(err.to_string()))?
            .push(text.to_owned());
        Ok(())
    }
}
