//! Detected span model

use super::EntityType;
use serde::Serialize;

/// A detected range of sensitive text
///
/// Offsets are UTF-8 byte offsets into the analyzed text and always fall on
/// character boundaries. Spans are immutable once produced; the only way to
/// obtain one is [`Span::new`], which rejects empty ranges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Span {
    start: usize,
    end: usize,
    entity_type: EntityType,
    score: f32,
    source: String,
}

impl Span {
    /// Create a span, returning `None` for zero-width or inverted ranges
    ///
    /// The score is clamped to `[0.0, 1.0]`; a NaN score becomes `0.0`.
    pub fn new(
        start: usize,
        end: usize,
        entity_type: EntityType,
        score: f32,
        source: impl Into<String>,
    ) -> Option<Self> {
        if end <= start {
            return None;
        }
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };
        Some(Self {
            start,
            end,
            entity_type,
            score,
            source: source.into(),
        })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    /// Identifier of the recognizer that produced this span
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false; kept for clippy's `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether the two ranges share at least one byte
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Slice of `text` covered by this span, if the offsets are valid for it
    pub fn text<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}
