//! Pushover notifier.
//!
//! Posts `{token, user, message}` as a form to the Pushover messages API.

use alterego_core::error::NotifyError;
use alterego_core::Notifier;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

pub const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";

pub struct PushoverNotifier {
    token: String,
    user: String,
    endpoint: String,
    client: reqwest::Client,
}

impl PushoverNotifier {
    pub fn new(token: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: user.into(),
            endpoint: PUSHOVER_API_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Send to a different endpoint (tests, relays).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl std::fmt::Debug for PushoverNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushoverNotifier")
            .field("token", &"[REDACTED]")
            .field("user", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    fn name(&self) -> &str {
        "pushover"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        debug!(content_len = text.len(), "Pushover send");

        let form = [
            ("token", self.token.as_str()),
            ("user", self.user.as_str()),
            ("message", text),
        ];
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(Duration::from_secs(10))
            .form(&form)
            .send()
            .await
            .map_err(|e| NotifyError::DeliveryFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Pushover rejected notification");
            return Err(NotifyError::DeliveryFailed(format!(
                "Pushover returned HTTP {}",
                status.as_u16()
            )));
        }

        Ok(())
    }
}
