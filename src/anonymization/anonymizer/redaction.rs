//! Redaction strategy

use super::Operator;
use crate::anonymization::models::EntityType;

/// Placeholder used when none is configured
pub const DEFAULT_PLACEHOLDER: &str = "[REDACTED]";

/// Replaces a value with a fixed placeholder or a `[TYPE_REDACTED]` token
#[derive(Debug, Clone, Default)]
pub struct RedactOperator {
    pub placeholder: Option<String>,
    pub include_type: bool,
}

impl Operator for RedactOperator {
    fn name(&self) -> &'static str {
        "redact"
    }

    fn operate(&self, _value: &str, entity_type: &EntityType) -> String {
        if self.include_type {
            return format!("[{}_REDACTED]", entity_type.as_str());
        }
        self.placeholder
            .clone()
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string())
    }
}
