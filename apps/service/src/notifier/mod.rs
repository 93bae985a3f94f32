//! Alert delivery transports and the per-contact dispatch.

pub mod email;
pub mod router;
pub mod webhook;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("notify: {0}")]
pub struct NotifyError(pub String);

/// Delivery seam for composed alert batches. One method per transport;
/// the router picks the method from the contact's address shape.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, addresses: &[String], body: &str) -> Result<(), NotifyError>;

    async fn send_webhook(&self, url: &str, body: &str) -> Result<(), NotifyError>;
}

/// Production transport bundle. SMTP is optional; without it, email
/// contacts fail with a logged delivery error instead of aborting the
/// cycle.
pub struct Transports {
    email: Option<email::EmailNotifier>,
    webhook: webhook::WebhookNotifier,
}

impl Transports {
    pub fn new(email: Option<email::EmailNotifier>) -> Self {
        Self { email, webhook: webhook::WebhookNotifier::new() }
    }
}

#[async_trait]
impl Notifier for Transports {
    async fn send_email(&self, addresses: &[String], body: &str) -> Result<(), NotifyError> {
        match &self.email {
            Some(transport) => transport.send(addresses, body).await,
            None => Err(NotifyError("no SMTP transport configured".to_string())),
        }
    }

    async fn send_webhook(&self, url: &str, body: &str) -> Result<(), NotifyError> {
        self.webhook.send(url, body).await
    }
}
