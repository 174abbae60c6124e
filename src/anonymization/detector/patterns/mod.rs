//! Pattern library for span recognition
//!
//! Recognizer definitions live in TOML. The default library is embedded in
//! the binary; a custom library file can replace it through the
//! `anonymization.pattern_library` setting.

use crate::anonymization::models::EntityType;
use anyhow::{Context, Result};
use fancy_regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Checksum used to confirm or reject a pattern match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validator {
    /// Luhn mod-10 (payment cards)
    Luhn,
    /// ISO 13616 mod-97 (IBAN)
    Iban,
}

impl Validator {
    /// Check the matched text
    pub fn validate(&self, matched: &str) -> bool {
        match self {
            Validator::Luhn => luhn_valid(matched),
            Validator::Iban => iban_valid(matched),
        }
    }
}

/// Single pattern rule as written in TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    pub name: String,
    pub regex: String,
    pub score: f32,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub validator: Option<Validator>,
}

/// Recognizer definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RecognizerDefinition {
    /// Entity type label emitted by this recognizer
    pub entity_type: String,
    /// Context keywords or phrases that boost nearby matches
    #[serde(default)]
    pub context: Vec<String>,
    pub patterns: Vec<PatternDefinition>,
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    recognizers: BTreeMap<String, RecognizerDefinition>,
}

/// Compiled pattern rule
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub name: String,
    pub regex: Regex,
    pub score: f32,
    pub validator: Option<Validator>,
}

/// Compiled recognizer ready to build a [`PatternRecognizer`](super::regex::PatternRecognizer)
#[derive(Debug, Clone)]
pub struct CompiledRecognizer {
    pub id: String,
    pub entity_type: EntityType,
    pub context: Vec<String>,
    pub patterns: Vec<CompiledPattern>,
}

/// Registry of compiled recognizer definitions
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    recognizers: Vec<CompiledRecognizer>,
}

impl PatternRegistry {
    /// Load a pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read pattern library: {}",
                path.as_ref().display()
            )
        })?;

        Self::from_toml(&content)
    }

    /// Build a pattern registry from TOML content
    ///
    /// Recognizers are ordered by id so that detection output is stable.
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary =
            toml::from_str(content).context("Failed to parse pattern library TOML")?;

        let mut recognizers = Vec::with_capacity(library.recognizers.len());

        for (id, def) in library.recognizers {
            if def.patterns.is_empty() {
                anyhow::bail!("Recognizer '{id}' defines no patterns");
            }

            let entity_type = EntityType::from(def.entity_type.as_str());
            let mut patterns = Vec::with_capacity(def.patterns.len());

            for pattern in &def.patterns {
                if !(0.0..=1.0).contains(&pattern.score) {
                    anyhow::bail!(
                        "Pattern '{}' in recognizer '{id}' has score {} outside [0, 1]",
                        pattern.name,
                        pattern.score
                    );
                }

                let source = if pattern.case_sensitive {
                    pattern.regex.clone()
                } else {
                    format!("(?i){}", pattern.regex)
                };
                let regex = Regex::new(&source).with_context(|| {
                    format!(
                        "Invalid regex in pattern '{}' of recognizer '{id}': {}",
                        pattern.name, pattern.regex
                    )
                })?;

                patterns.push(CompiledPattern {
                    name: pattern.name.clone(),
                    regex,
                    score: pattern.score,
                    validator: pattern.validator,
                });
            }

            recognizers.push(CompiledRecognizer {
                id,
                entity_type,
                context: def.context,
                patterns,
            });
        }

        Ok(Self { recognizers })
    }

    /// Registry with the built-in pattern library
    pub fn default_patterns() -> Result<Self> {
        let default_toml = include_str!("../../../../patterns/default_patterns.toml");
        Self::from_toml(default_toml)
    }

    /// All compiled recognizers
    pub fn recognizers(&self) -> &[CompiledRecognizer] {
        &self.recognizers
    }

    /// Recognizers emitting a given entity type
    pub fn recognizers_for(&self, entity_type: &EntityType) -> Vec<&CompiledRecognizer> {
        self.recognizers
            .iter()
            .filter(|r| &r.entity_type == entity_type)
            .collect()
    }
}

fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(12..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

fn iban_valid(candidate: &str) -> bool {
    let compact: String = candidate
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if !(15..=34).contains(&compact.len()) || !compact.is_ascii() {
        return false;
    }

    let (head, tail) = compact.split_at(4);
    let mut remainder: u32 = 0;
    for c in tail.chars().chain(head.chars()) {
        let value = match c {
            '0'..='9' => c as u32 - '0' as u32,
            'A'..='Z' => c as u32 - 'A' as u32 + 10,
            _ => return false,
        };
        remainder = if value >= 10 {
            (remainder * 100 + value) % 97
        } else {
            (remainder * 10 + value) % 97
        };
    }

    remainder == 1
}
