use std::time::Duration;

use herald_core::template::MessageTemplate;

/// Runtime limits for a dispatch run.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Maximum records in flight at once (at least 1).
    pub max_in_flight: usize,
    /// Upper bound for one gateway call.
    pub send_timeout: Duration,
    /// Upper bound for one status transition.
    pub transition_timeout: Duration,
    /// How long in-flight records may keep running after cancellation.
    pub shutdown_grace: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 8,
            send_timeout: Duration::from_secs(20),
            transition_timeout: Duration::from_secs(10),
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

impl DispatchConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `DISPATCH_MAX_IN_FLIGHT`  | `8`     |
    /// | `SEND_TIMEOUT_SECS`       | `20`    |
    /// | `TRANSITION_TIMEOUT_SECS` | `10`    |
    /// | `SHUTDOWN_GRACE_SECS`     | `10`    |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_in_flight = env_parse("DISPATCH_MAX_IN_FLIGHT").unwrap_or(defaults.max_in_flight);

        Self {
            max_in_flight: max_in_flight.max(1),
            send_timeout: env_parse("SEND_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.send_timeout),
            transition_timeout: env_parse("TRANSITION_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.transition_timeout),
            shutdown_grace: env_parse("SHUTDOWN_GRACE_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.shutdown_grace),
        }
    }
}

/// Message template from `SMS_MESSAGE_TEMPLATE`, or the default.
pub fn message_template_from_env() -> MessageTemplate {
    match std::env::var("SMS_MESSAGE_TEMPLATE") {
        Ok(source) => MessageTemplate::new(source).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring SMS_MESSAGE_TEMPLATE, using default template");
            MessageTemplate::default()
        }),
        Err(_) => MessageTemplate::default(),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment variable");
            None
        }
    }
}
