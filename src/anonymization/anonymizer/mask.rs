//! Partial masking

use super::Operator;
use crate::anonymization::models::EntityType;

/// Characters left visible when `chars_to_mask` is not set
const DEFAULT_VISIBLE: usize = 4;

/// Replaces a run of characters with a masking character
///
/// `4111-1111-1111-1111` becomes `***************1111` with the defaults.
#[derive(Debug, Clone)]
pub struct MaskOperator {
    pub masking_char: char,
    /// Number of characters to mask; all but the last four when `None`
    pub chars_to_mask: Option<usize>,
    /// Mask the end of the value instead of the start
    pub from_end: bool,
}

impl Default for MaskOperator {
    fn default() -> Self {
        Self {
            masking_char: '*',
            chars_to_mask: None,
            from_end: false,
        }
    }
}

impl Operator for MaskOperator {
    fn name(&self) -> &'static str {
        "mask"
    }

    fn operate(&self, value: &str, _entity_type: &EntityType) -> String {
        let len = value.chars().count();
        let count = self
            .chars_to_mask
            .unwrap_or_else(|| len.saturating_sub(DEFAULT_VISIBLE))
            .min(len);

        let masked = std::iter::repeat(self.masking_char).take(count);
        if self.from_end {
            value.chars().take(len - count).chain(masked).collect()
        } else {
            masked.chain(value.chars().skip(count)).collect()
        }
    }
}
