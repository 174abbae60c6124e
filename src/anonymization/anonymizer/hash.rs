//! One-way hashing of values

use super::Operator;
use crate::anonymization::models::EntityType;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

/// Digest used by [`HashOperator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

/// Replaces a value with its lowercase hex digest
///
/// Unsalted: equal inputs hash to equal outputs across runs.
#[derive(Debug, Clone, Default)]
pub struct HashOperator {
    pub algorithm: HashAlgorithm,
    /// Keep only the first `n` hex characters
    pub truncate: Option<usize>,
}

impl Operator for HashOperator {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn operate(&self, value: &str, _entity_type: &EntityType) -> String {
        let mut digest = match self.algorithm {
            HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(value.as_bytes())),
            HashAlgorithm::Sha512 => format!("{:x}", Sha512::digest(value.as_bytes())),
        };
        if let Some(n) = self.truncate.filter(|&n| n > 0) {
            digest.truncate(n);
        }
        digest
    }
}
