//! Local replacement operators
//!
//! Operators transform a detected value without touching the mapping store.
//! The consistent-replace strategy is not an operator: it needs the store
//! and is resolved by the engine.

pub mod hash;
pub mod mask;
pub mod redaction;

use crate::anonymization::config::StrategyConfig;
use crate::anonymization::models::EntityType;
use std::sync::Arc;

pub use hash::{HashAlgorithm, HashOperator};
pub use mask::MaskOperator;
pub use redaction::RedactOperator;

/// A stateless value transformation
pub trait Operator: Send + Sync {
    /// Strategy name as used in configuration
    fn name(&self) -> &'static str;

    /// Replacement for `value`
    fn operate(&self, value: &str, entity_type: &EntityType) -> String;
}

/// Build the operator for a strategy, or `None` for consistent replacement
pub fn operator_for(strategy: &StrategyConfig) -> Option<Arc<dyn Operator>> {
    match strategy {
        StrategyConfig::ConsistentReplace => None,
        StrategyConfig::Mask {
            masking_char,
            chars_to_mask,
            from_end,
        } => Some(Arc::new(MaskOperator {
            masking_char: *masking_char,
            chars_to_mask: *chars_to_mask,
            from_end: *from_end,
        })),
        StrategyConfig::Hash {
            hash_type,
            truncate,
        } => Some(Arc::new(HashOperator {
            algorithm: *hash_type,
            truncate: *truncate,
        })),
        StrategyConfig::Redact {
            placeholder,
            include_type,
        } => Some(Arc::new(RedactOperator {
            placeholder: placeholder.clone(),
            include_type: *include_type,
        })),
    }
}
