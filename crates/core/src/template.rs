//! Message body templating.
//!
//! Templates are plain strings with `{phone}` and `{id}` placeholders that are
//! substituted from record fields when a store adapter builds a
//! [`NotificationRecord`](crate::record::NotificationRecord).

use crate::error::CoreError;
use crate::types::RecordId;

/// Template used when none is configured.
pub const DEFAULT_TEMPLATE: &str =
    "Status update: Your employee record (phone: {phone}) will be marked as processed.";

const PLACEHOLDER_PHONE: &str = "{phone}";
const PLACEHOLDER_ID: &str = "{id}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    source: String,
}

impl MessageTemplate {
    /// Create a template, rejecting an empty body.
    pub fn new(source: impl Into<String>) -> Result<Self, CoreError> {
        let source = source.into();
        if source.trim().is_empty() {
            return Err(CoreError::Validation(
                "Message template must not be empty".to_string(),
            ));
        }
        Ok(Self { source })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitute placeholders in one pass; substituted values are never
    /// rescanned.
    pub fn render(&self, id: RecordId, phone: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + phone.len());
        let mut rest = self.source.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix(PLACEHOLDER_PHONE) {
                out.push_str(phone);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(PLACEHOLDER_ID) {
                out.push_str(&id.to_string());
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
        }
    }
}
