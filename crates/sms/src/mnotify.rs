//! mNotify `smsapi` gateway.
//!
//! One HTTP GET per message with `key`, `to`, `msg` and `sender_id` query
//! parameters. The provider answers with a JSON body; a send is confirmed only
//! when `status == "success"` and `code == "1000"`.

use async_trait::async_trait;
use herald_core::gateway::{NotificationGateway, SendConfirmation};
use serde::Deserialize;

use crate::config::SmsConfig;

/// Status value the provider uses for an accepted message.
const STATUS_SUCCESS: &str = "success";

/// Response code the provider uses for an accepted message.
const CODE_ACCEPTED: &str = "1000";

/// Reason reported when a rejection carries no message.
const DEFAULT_REJECTION: &str = "Invalid Number";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("SMS gateway returned HTTP {0}")]
    HttpStatus(u16),

    /// The response body was not the expected JSON.
    #[error("Unreadable SMS gateway response: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Body returned by the `smsapi` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MnotifyResponse {
    #[serde(default)]
    pub status: Option<String>,
    /// Sent as a string by the provider, tolerated as a number.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl MnotifyResponse {
    fn code_str(&self) -> Option<String> {
        match self.code.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
            && self.code_str().as_deref() == Some(CODE_ACCEPTED)
    }

    /// Translate the body into a confirmation.
    pub fn confirmation(&self) -> SendConfirmation {
        if self.is_accepted() {
            return SendConfirmation::Succeeded {
                message: self.message.clone(),
            };
        }
        let reason = self
            .message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REJECTION.to_string());
        match self.code_str() {
            Some(code) => SendConfirmation::rejected(format!("{reason} (code {code})")),
            None => SendConfirmation::rejected(reason),
        }
    }
}

// ---------------------------------------------------------------------------
// MnotifyGateway
// ---------------------------------------------------------------------------

pub struct MnotifyGateway {
    client: reqwest::Client,
    config: SmsConfig,
}

impl MnotifyGateway {
    /// Build a gateway with its own HTTP client.
    pub fn new(config: SmsConfig) -> Result<Self, SmsError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Build a gateway reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: SmsConfig) -> Self {
        Self { client, config }
    }

    /// Issue a single send request and decode the provider's answer.
    pub async fn try_send(&self, to: &str, msg: &str) -> Result<MnotifyResponse, SmsError> {
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("to", to),
                ("msg", msg),
                ("sender_id", self.config.sender_id.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SmsError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| SmsError::Decode(e.to_string()))
    }
}

#[async_trait]
impl NotificationGateway for MnotifyGateway {
    async fn send(&self, destination_address: &str, message_body: &str) -> SendConfirmation {
        match self.try_send(destination_address, message_body).await {
            Ok(body) => {
                let confirmation = body.confirmation();
                if confirmation.is_confirmed() {
                    tracing::debug!(to = destination_address, "SMS accepted by gateway");
                } else {
                    tracing::debug!(to = destination_address, ?confirmation, "SMS rejected by gateway");
                }
                confirmation
            }
            // 4xx means the provider looked at the request and refused it.
            Err(SmsError::HttpStatus(code)) if (400..500).contains(&code) => {
                SendConfirmation::rejected(format!("SMS gateway returned HTTP {code}"))
            }
            Err(e) => {
                // reqwest errors can echo the request URL, which carries the key.
                let detail = match e {
                    SmsError::Request(err) => SmsError::Request(err.without_url()).to_string(),
                    other => other.to_string(),
                };
                tracing::warn!(to = destination_address, error = %detail, "SMS gateway request failed");
                SendConfirmation::transport_error(detail)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
