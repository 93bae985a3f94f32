//! Per-contact dispatch of batched alert lines. One send per contact per
//! cycle; delivery failures are logged, never retried, and never block
//! other contacts.

use tracing::error;

use super::Notifier;
use crate::incident::routing::MessageBatches;

/// Flatten each contact's batch and hand it to the transport matching the
/// address shape: `http(s)://` means webhook, anything else is email.
pub async fn dispatch(notifier: &dyn Notifier, batches: MessageBatches) {
    for (contact, lines) in batches {
        let body = lines.join("\r\n");

        let result = if contact.starts_with("https://") || contact.starts_with("http://") {
            notifier.send_webhook(&contact, &body).await
        } else {
            notifier.send_email(std::slice::from_ref(&contact), &body).await
        };

        if let Err(err) = result {
            error!("failed to deliver alert batch to {contact}: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::notifier::NotifyError;

    #[derive(Default)]
    struct RecordingNotifier {
        emails: Mutex<Vec<(Vec<String>, String)>>,
        webhooks: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_email(&self, addresses: &[String], body: &str) -> Result<(), NotifyError> {
            self.emails.lock().unwrap().push((addresses.to_vec(), body.to_string()));
            Ok(())
        }

        async fn send_webhook(&self, url: &str, body: &str) -> Result<(), NotifyError> {
            self.webhooks.lock().unwrap().push((url.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn routes_by_address_shape() {
        let notifier = RecordingNotifier::default();
        let mut batches = MessageBatches::new();
        batches.insert("ops@example.com".into(), vec!["FAIL: a".into(), "FAIL: b".into()]);
        batches.insert("https://hooks.example/x".into(), vec!["FAIL: a".into()]);

        dispatch(&notifier, batches).await;

        let emails = notifier.emails.lock().unwrap();
        let webhooks = notifier.webhooks.lock().unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].0, vec!["ops@example.com"]);
        assert_eq!(emails[0].1, "FAIL: a\r\nFAIL: b");
        assert_eq!(webhooks.len(), 1);
        assert_eq!(webhooks[0].0, "https://hooks.example/x");
    }

    #[tokio::test]
    async fn one_send_per_contact() {
        let notifier = RecordingNotifier::default();
        let mut batches = MessageBatches::new();
        batches.insert(
            "ops@example.com".into(),
            vec!["rule one down".into(), "rule two down".into(), "rule three down".into()],
        );

        dispatch(&notifier, batches).await;

        let emails = notifier.emails.lock().unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].1, "rule one down\r\nrule two down\r\nrule three down");
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send_email(&self, _: &[String], _: &str) -> Result<(), NotifyError> {
            Err(NotifyError("smtp down".into()))
        }

        async fn send_webhook(&self, _: &str, _: &str) -> Result<(), NotifyError> {
            Err(NotifyError("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn delivery_failures_do_not_panic_or_block() {
        let mut batches = MessageBatches::new();
        batches.insert("ops@example.com".into(), vec!["FAIL: a".into()]);
        batches.insert("https://hooks.example/x".into(), vec!["FAIL: b".into()]);

        // Both sends fail; dispatch just logs and carries on
        dispatch(&FailingNotifier, batches).await;
    }
}
