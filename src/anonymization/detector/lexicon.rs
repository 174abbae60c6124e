//! Dictionary-backed recognizers for person and place names
//!
//! These give the pipeline PERSON and LOCATION coverage without an
//! external model. Person names are capitalized word runs anchored on a
//! known given name; places are gazetteer and country names.

use super::SpanRecognizer;
use crate::anonymization::generator::location::{COUNTRY_NAMES, GAZETTEER};
use crate::anonymization::generator::names::data::all_first_names;
use crate::anonymization::models::{EntityType, Span};
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;

/// Score for a known given name followed by at least one capitalized word
pub const FULL_NAME_SCORE: f32 = 0.85;

/// Score for a known given name standing alone
pub const GIVEN_NAME_SCORE: f32 = 0.4;

/// Score for a gazetteer or country name
pub const PLACE_SCORE: f32 = 0.7;

/// Maximum number of words in a detected full name
const MAX_NAME_WORDS: usize = 3;

/// Person names anchored on the given-name tables
pub struct PersonNameRecognizer {
    first_names: HashSet<String>,
    entity_type: EntityType,
}

impl PersonNameRecognizer {
    pub fn new() -> Self {
        Self {
            first_names: all_first_names().map(str::to_lowercase).collect(),
            entity_type: EntityType::Person,
        }
    }
}

impl Default for PersonNameRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Word with its byte range
struct Word<'a> {
    start: usize,
    end: usize,
    text: &'a str,
}

fn words(text: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, c) in text.char_indices() {
        let part_of_word = c.is_alphabetic() || ((c == '-' || c == '\'') && start.is_some());
        match (part_of_word, start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                words.push(Word {
                    start: s,
                    end: idx,
                    text: &text[s..idx],
                });
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push(Word {
            start: s,
            end: text.len(),
            text: &text[s..],
        });
    }

    // Trailing hyphens or apostrophes are punctuation, not part of the word
    for word in &mut words {
        let trimmed = word.text.trim_end_matches(['-', '\'']);
        word.end = word.start + trimmed.len();
        word.text = trimmed;
    }
    words
}

fn is_capitalized(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c.is_uppercase())
        && chars.clone().next().is_some()
        && !chars.all(|c| c.is_uppercase())
}

/// Whether only whitespace separates two words on the same line
fn adjacent(text: &str, left: &Word<'_>, right: &Word<'_>) -> bool {
    let gap = &text[left.end..right.start];
    !gap.is_empty() && gap.chars().all(|c| c == ' ' || c == '\t')
}

impl SpanRecognizer for PersonNameRecognizer {
    fn id(&self) -> &str {
        "person_name_lexicon"
    }

    fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    fn find(&self, text: &str) -> Result<Vec<Span>> {
        let words = words(text);
        let mut spans = Vec::new();
        let mut i = 0;

        while i < words.len() {
            let word = &words[i];
            if !is_capitalized(word.text) || !self.first_names.contains(&word.text.to_lowercase()) {
                i += 1;
                continue;
            }

            let mut last = i;
            while last + 1 < words.len()
                && last - i + 1 < MAX_NAME_WORDS
                && is_capitalized(words[last + 1].text)
                && adjacent(text, &words[last], &words[last + 1])
            {
                last += 1;
            }

            let score = if last > i {
                FULL_NAME_SCORE
            } else {
                GIVEN_NAME_SCORE
            };
            if let Some(span) = Span::new(word.start, words[last].end, self.entity_type.clone(), score, self.id()) {
                spans.push(span);
            }
            i = last + 1;
        }

        Ok(spans)
    }
}

/// Place names from the embedded gazetteer and country list
pub struct PlaceNameRecognizer {
    regex: Option<Regex>,
    entity_type: EntityType,
}

impl PlaceNameRecognizer {
    pub fn new() -> Self {
        let regex = Self::build().map_err(|e| {
            tracing::warn!(error = %e, "Place lexicon failed to compile, recognizer disabled");
        });
        Self {
            regex: regex.ok(),
            entity_type: EntityType::Location,
        }
    }

    fn build() -> Result<Regex> {
        let mut names: Vec<&str> = GAZETTEER
            .iter()
            .map(|p| p.name)
            .chain(COUNTRY_NAMES.iter().copied())
            .collect();
        // Longest first so "New York" wins over "York"
        names.sort_by_key(|n| std::cmp::Reverse(n.len()));
        names.dedup();

        let alternation = names
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"\b(?:{alternation})\b")).context("Failed to compile place lexicon")
    }
}

impl Default for PlaceNameRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpanRecognizer for PlaceNameRecognizer {
    fn id(&self) -> &str {
        "place_name_lexicon"
    }

    fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    fn find(&self, text: &str) -> Result<Vec<Span>> {
        let Some(regex) = &self.regex else {
            return Ok(Vec::new());
        };

        Ok(regex
            .find_iter(text)
            .filter_map(|m| {
                Span::new(m.start(), m.end(), self.entity_type.clone(), PLACE_SCORE, self.id())
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_anchored_on_given_name() {
        let text = "Contact John Smith at 555-123-4567";
        let spans = PersonNameRecognizer::new().find(text).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text(text), Some("John Smith"));
        assert_eq!(spans[0].score(), FULL_NAME_SCORE);
    }

    #[test]
    fn test_given_name_alone_scores_low() {
        let text = "ask Maria tomorrow";
        let spans = PersonNameRecognizer::new().find(text).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].score(), GIVEN_NAME_SCORE);
    }

    #[test]
    fn test_name_does_not_cross_lines() {
        let text = "John\nSmith";
        let spans = PersonNameRecognizer::new().find(text).unwrap();
        assert_eq!(spans[0].text(text), Some("John"));
    }

    #[test]
    fn test_lowercase_is_ignored() {
        assert!(PersonNameRecognizer::new()
            .find("john smith wrote this")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_cyrillic_name() {
        let text = "Пишет Александр Иванов.";
        let spans = PersonNameRecognizer::new().find(text).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text(text), Some("Александр Иванов"));
    }

    #[test]
    fn test_trailing_punctuation_is_trimmed() {
        let text = "Sarah O'Brien- called";
        let spans = PersonNameRecognizer::new().find(text).unwrap();
        assert_eq!(spans[0].text(text), Some("Sarah O'Brien"));
    }

    #[test]
    fn test_place_names() {
        let text = "Flew from New York to Paris, France.";
        let spans = PlaceNameRecognizer::new().find(text).unwrap();
        let found: Vec<&str> = spans.iter().filter_map(|s| s.text(text)).collect();
        assert_eq!(found, vec!["New York", "Paris", "France"]);
    }

    #[test]
    fn test_place_requires_word_boundary() {
        assert!(PlaceNameRecognizer::new()
            .find("Parisian cafes")
            .unwrap()
            .is_empty());
    }
}
