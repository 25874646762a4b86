//! Chat webhook outbound adapter.

mod http_notifier;

pub use http_notifier::WebhookHttpNotifier;
