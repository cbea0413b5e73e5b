use std::time::Duration;

/// Default mNotify endpoint.
const DEFAULT_API_URL: &str = "https://apps.mnotify.net/smsapi";

/// Default sender ID shown to recipients.
const DEFAULT_SENDER_ID: &str = "esopht";

/// Default per-request HTTP timeout in seconds.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Configuration for the SMS gateway.
#[derive(Clone)]
pub struct SmsConfig {
    /// Endpoint the send request is issued against.
    pub api_url: String,
    /// Account API key.
    pub api_key: String,
    /// Sender ID registered with the provider.
    pub sender_id: String,
    /// HTTP client timeout.
    pub http_timeout: Duration,
}

impl SmsConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMS_API_KEY` is not set, signalling that the gateway
    /// is not configured.
    ///
    /// | Variable                | Required | Default                           |
    /// |-------------------------|----------|-----------------------------------|
    /// | `SMS_API_KEY`           | yes      | -                                 |
    /// | `SMS_API_URL`           | no       | `https://apps.mnotify.net/smsapi` |
    /// | `SMS_SENDER_ID`         | no       | `esopht`                          |
    /// | `SMS_HTTP_TIMEOUT_SECS` | no       | `15`                              |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("SMS_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;
        Some(Self {
            api_url: std::env::var("SMS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_key,
            sender_id: std::env::var("SMS_SENDER_ID")
                .unwrap_or_else(|_| DEFAULT_SENDER_ID.to_string()),
            http_timeout: Duration::from_secs(
                std::env::var("SMS_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
        })
    }

    /// Configuration pointing at `api_url` with default sender and timeout.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            sender_id: DEFAULT_SENDER_ID.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

// The API key must never reach the logs.
impl std::fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("sender_id", &self.sender_id)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_api_key() {
        let config = SmsConfig::new("http://localhost", "super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
