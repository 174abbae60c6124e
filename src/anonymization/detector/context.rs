//! Context-keyword score boosting
//!
//! A match whose surroundings contain one of the recognizer's context
//! keywords receives an additive boost of [`CONTEXT_BOOST`], capped at 1.0.
//! The window is [`CONTEXT_WINDOW_WORDS`] words before and after the match.
//! A word is a run of alphanumeric characters, `#` or `'`; comparison is
//! case-insensitive and multi-word keywords must appear as a contiguous
//! phrase on one side of the match.

/// Additive score boost applied when a context keyword is present
pub const CONTEXT_BOOST: f32 = 0.35;

/// Number of words inspected on each side of a match
pub const CONTEXT_WINDOW_WORDS: usize = 5;

/// Pre-tokenized context keywords for one recognizer
#[derive(Debug, Clone, Default)]
pub struct ContextKeywords {
    phrases: Vec<Vec<String>>,
}

impl ContextKeywords {
    pub fn new(keywords: &[String]) -> Self {
        let phrases = keywords
            .iter()
            .map(|k| tokenize(k).into_iter().map(|(_, w)| w).collect::<Vec<_>>())
            .filter(|p: &Vec<String>| !p.is_empty())
            .collect();
        Self { phrases }
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Whether any keyword occurs in the window around `start..end`
    pub fn present_around(&self, text: &str, start: usize, end: usize) -> bool {
        if self.phrases.is_empty() {
            return false;
        }

        let lo = char_boundary_at_or_before(text, start.saturating_sub(WINDOW_SCAN_BYTES));
        let hi = char_boundary_at_or_before(text, (end + WINDOW_SCAN_BYTES).min(text.len()));

        let before: Vec<String> = {
            let words = tokenize(&text[lo..start]);
            let skip = words.len().saturating_sub(CONTEXT_WINDOW_WORDS);
            words.into_iter().skip(skip).map(|(_, w)| w).collect()
        };
        let after: Vec<String> = tokenize(&text[end..hi])
            .into_iter()
            .take(CONTEXT_WINDOW_WORDS)
            .map(|(_, w)| w)
            .collect();

        self.phrases
            .iter()
            .any(|phrase| contains_phrase(&before, phrase) || contains_phrase(&after, phrase))
    }

    /// Score after applying the boost, if the context matches
    pub fn boosted_score(&self, text: &str, start: usize, end: usize, base: f32) -> f32 {
        if self.present_around(text, start, end) {
            (base + CONTEXT_BOOST).min(1.0)
        } else {
            base
        }
    }
}

/// Bytes scanned on each side of a match when collecting window words
const WINDOW_SCAN_BYTES: usize = 256;

fn char_boundary_at_or_before(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '#' || c == '\''
}

/// Split text into lower-cased words with their byte offsets
pub(crate) fn tokenize(text: &str) -> Vec<(usize, String)> {
    let mut words = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (idx, c) in text.char_indices() {
        if is_word_char(c) {
            match current.as_mut() {
                Some((_, word)) => word.extend(c.to_lowercase()),
                None => current = Some((idx, c.to_lowercase().collect())),
            }
        } else if let Some(word) = current.take() {
            words.push(word);
        }
    }
    if let Some(word) = current {
        words.push(word);
    }

    words
}

fn contains_phrase(words: &[String], phrase: &[String]) -> bool {
    if phrase.len() > words.len() {
        return false;
    }
    words.windows(phrase.len()).any(|w| w == phrase)
}
