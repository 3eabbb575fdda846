//! Outbound webhook -- mirror logged sessions into an external task list.
//!
//! Delivery is a single best-effort POST. There is no queue and no retry;
//! a failed delivery is reported to the caller and never touches the log.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use url::Url;

use crate::error::WebhookError;
use crate::storage::{LogEntry, WebhookConfig};

/// Schema version sent with every payload.
pub const PAYLOAD_VERSION: &str = "1.0";
/// Header carrying `sha256=<hex hmac>` when a secret is configured.
pub const SIGNATURE_HEADER: &str = "X-Focuslog-Signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    SessionLogged,
}

/// Versioned webhook payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub version: String,
    pub event_type: WebhookEventType,
    /// Unique event ID for receiver-side idempotency.
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    /// Task-list friendly title: the planned task, or a generic label.
    pub title: String,
    pub entry: LogEntry,
}

impl WebhookPayload {
    pub fn session_logged(entry: &LogEntry) -> Self {
        let title = if entry.planned_task.trim().is_empty() {
            format!("Focus session ({}m)", entry.duration_minutes)
        } else {
            entry.planned_task.clone()
        };
        Self {
            version: PAYLOAD_VERSION.to_string(),
            event_type: WebhookEventType::SessionLogged,
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            title,
            entry: entry.clone(),
        }
    }
}

/// Hex HMAC-SHA256 of `body` under `secret`.
pub fn sign(body: &[u8], secret: &[u8]) -> String {
    // HMAC accepts keys of any length.
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return String::new();
    };
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryResult {
    pub success: bool,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

/// Client for a single configured endpoint.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Client,
    url: Url,
    secret: Option<String>,
    headers: HashMap<String, String>,
}

impl WebhookClient {
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, WebhookError> {
        let url = Url::parse(url).map_err(|source| WebhookError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url,
            secret: None,
            headers: HashMap::new(),
        })
    }

    /// Build from configuration.
    ///
    /// # Errors
    /// Returns `NotConfigured` when the webhook is disabled or has no URL.
    pub fn from_config(config: &WebhookConfig) -> Result<Self, WebhookError> {
        if !config.enabled || config.url.trim().is_empty() {
            return Err(WebhookError::NotConfigured);
        }
        let mut client = Self::new(config.url.trim(), Duration::from_secs(config.timeout_secs))?;
        if !config.secret.is_empty() {
            client = client.with_secret(config.secret.clone());
        }
        for (key, value) in &config.headers {
            client = client.with_header(key.clone(), value.clone());
        }
        Ok(client)
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// POST the entry once. Returns the HTTP status on success.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-2xx status.
    pub async fn deliver(&self, entry: &LogEntry) -> Result<u16, WebhookError> {
        let payload = WebhookPayload::session_logged(entry);
        let body = serde_json::to_vec(&payload)?;

        let mut request = self
            .client
            .post(self.url.clone())
            .header("Content-Type", "application/json");
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        if let Some(secret) = &self.secret {
            request = request.header(
                SIGNATURE_HEADER,
                format!("sha256={}", sign(&body, secret.as_bytes())),
            );
        }

        let resp = request.body(body).send().await?;
        let status = resp.status();
        if status.is_success() {
            tracing::debug!(entry_id = entry.id, status = status.as_u16(), "webhook delivered");
            Ok(status.as_u16())
        } else {
            let text = resp.text().await.unwrap_or_default();
            Err(WebhookError::HttpStatus {
                code: status.as_u16(),
                body: text,
            })
        }
    }

    /// Deliver without propagating failure.
    pub async fn deliver_best_effort(&self, entry: &LogEntry) -> DeliveryResult {
        match self.deliver(entry).await {
            Ok(code) => DeliveryResult {
                success: true,
                status_code: Some(code),
                error: None,
            },
            Err(e) => {
                tracing::warn!(entry_id = entry.id, url = %self.url, "webhook delivery failed: {e}");
                let status_code = match &e {
                    WebhookError::HttpStatus { code, .. } => Some(*code),
                    _ => None,
                };
                DeliveryResult {
                    success: false,
                    status_code,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> LogEntry {
        LogEntry {
            id: 7,
            created_at: Utc::now(),
            planned_task: String::new(),
            outcome_notes: "done".into(),
            interruptions: String::new(),
            duration_minutes: 25,
            category: None,
        }
    }

    #[test]
    fn sign_matches_known_vector() {
        assert_eq!(
            sign(b"The quick brown fox jumps over the lazy dog", b"key"),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn payload_uses_fallback_title() {
        let payload = WebhookPayload::session_logged(&sample_entry());
        assert_eq!(payload.title, "Focus session (25m)");
        assert_eq!(payload.version, PAYLOAD_VERSION);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["event_type"], "session_logged");
        assert_eq!(json["entry"]["id"], 7);
    }

    #[test]
    fn from_config_requires_enabled_url() {
        let mut cfg = WebhookConfig::default();
        assert!(matches!(
            WebhookClient::from_config(&cfg),
            Err(WebhookError::NotConfigured)
        ));
        cfg.enabled = true;
        cfg.url = "not a url".into();
        assert!(matches!(
            WebhookClient::from_config(&cfg),
            Err(WebhookError::InvalidUrl { .. })
        ));
        cfg.url = "https://example.com/hook".into();
        assert!(WebhookClient::from_config(&cfg).is_ok());
    }
}
