// # Pushover Notifier
//
// Sends a push message through the Pushover messages API when a cycle
// changed records and the reload finished cleanly.
//
// `POST https://api.pushover.net/1/messages.json`, form-encoded with the
// application token, the user key, a title and the message body.
//
// Delivery failures are returned to the engine, which logs them; nothing is
// retried.

use async_trait::async_trait;
use ddns_core::traits::Notifier;
use ddns_core::{Error, Result};
use std::time::Duration;

/// Pushover messages endpoint
pub const PUSHOVER_ENDPOINT: &str = "https://api.pushover.net/1/messages.json";

/// Pushover rejects messages longer than this many characters
const MAX_MESSAGE_LEN: usize = 1024;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Pushover notifier
pub struct PushoverNotifier {
    /// Application token
    /// ⚠️ NEVER log this value
    token: String,

    /// User or group key
    user: String,

    endpoint: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for PushoverNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushoverNotifier")
            .field("token", &"<REDACTED>")
            .field("user", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl PushoverNotifier {
    /// Create a notifier for `user` using application `token`
    pub fn new(token: impl Into<String>, user: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let user = user.into();

        if token.trim().is_empty() || user.trim().is_empty() {
            return Err(Error::config("Pushover token and user key are both required"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            token,
            user,
            endpoint: PUSHOVER_ENDPOINT.to_string(),
            client,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Cut `message` to the API limit on a char boundary
fn truncate(message: &str) -> &str {
    match message.char_indices().nth(MAX_MESSAGE_LEN) {
        Some((idx, _)) => &message[..idx],
        None => message,
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<()> {
        let params = [
            ("token", self.token.as_str()),
            ("user", self.user.as_str()),
            ("title", title),
            ("message", truncate(message)),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::notify(format!("Pushover request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::notify(format!(
                "Pushover rejected message: HTTP {} {}",
                status,
                body.trim()
            )));
        }

        tracing::debug!("Pushover notification sent");
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "pushover"
    }
}
