use reqwest::Client;

use super::NotifyError;

/// POSTs an alert batch to a contact's webhook URL.
pub struct WebhookNotifier {
    client: Client,
}

impl WebhookNotifier {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    pub async fn send(&self, url: &str, body: &str) -> Result<(), NotifyError> {
        self.client
            .post(url)
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| NotifyError(e.to_string()))?
            .error_for_status()
            .map_err(|e| NotifyError(e.to_string()))?;

        Ok(())
    }
}

impl Default for WebhookNotifier {
    fn default() -> Self {
        Self::new()
    }
}
