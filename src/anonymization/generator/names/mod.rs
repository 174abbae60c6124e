//! Culturally-aware person name generation
//!
//! The original name is split into fragments that are scored against the
//! per-country frequency tables in [`data`]. The best-scoring country
//! supplies the replacement, drawn from the same script class as the
//! original. Names with no recognizable origin fall back to the locale's
//! name faker.

pub mod data;

use super::Locale;
use data::{CountryNames, NameSet, COUNTRIES};
use fake::faker::name::raw::Name;
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;

/// Share of significant characters that must be Latin for a name to count as Latin script
const LATIN_SCRIPT_RATIO: f64 = 0.8;

/// Countries whose native script writes the family name first without a space
const FAMILY_FIRST: &[&str] = &["CN", "TW", "JP", "KR"];

/// Generate a replacement person name
pub fn generate_name<R: Rng + ?Sized>(original: Option<&str>, locale: Locale, rng: &mut R) -> String {
    let Some(original) = original else {
        return locale_name(locale, rng);
    };

    let latin = is_latin_script(original);
    let origin = detect_origin(original);
    if let Some(country) = origin {
        let set = if latin {
            Some(&country.latin)
        } else {
            country.native.as_ref()
        };
        if let Some(name) = set.and_then(|s| compose(country, s, !latin, rng)) {
            return name;
        }
    }

    let fallback = origin
        .and_then(|country| Locale::for_country(country.country))
        .or_else(|| script_locale(original))
        .unwrap_or(locale);
    locale_name(fallback, rng)
}

/// Most likely country of origin, by matching name fragments
///
/// Ties go to the country listed first in the tables.
pub fn detect_origin(name: &str) -> Option<&'static CountryNames> {
    let fragments: Vec<&str> = name
        .split(|c: char| c.is_whitespace() || c == '.' || c == ',')
        .filter(|f| !f.is_empty())
        .collect();
    if fragments.is_empty() {
        return None;
    }

    let mut best: Option<(&'static CountryNames, usize)> = None;
    for country in COUNTRIES {
        let score = origin_score(country, &fragments);
        if score > 0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((country, score));
        }
    }

    best.map(|(country, _)| country)
}

fn origin_score(country: &CountryNames, fragments: &[&str]) -> usize {
    let mut score = 0;
    for fragment in fragments {
        for set in std::iter::once(&country.latin).chain(country.native.as_ref()) {
            if set.is_first_name(fragment) {
                score += 1;
            }
            if set.is_last_name(fragment) {
                score += 1;
            }
        }

        // Family-first scripts without spaces: 王伟, 김민준
        if let Some(native) = &country.native {
            for last in native.last {
                if let Some(rest) = fragment.strip_prefix(last) {
                    if !rest.is_empty() {
                        score += 1;
                        if native.is_first_name(rest) {
                            score += 1;
                        }
                    }
                }
            }
        }
    }
    score
}

/// Whether the text is predominantly Latin script
///
/// Whitespace, hyphens, apostrophes and periods are ignored. Latin means
/// ASCII letters or Latin-1 Supplement through Latin Extended-B
/// (U+00C0 to U+024F).
pub fn is_latin_script(text: &str) -> bool {
    let mut significant = 0usize;
    let mut latin = 0usize;

    for c in text.chars() {
        if c.is_whitespace() || matches!(c, '-' | '\'' | '.') {
            continue;
        }
        significant += 1;
        if c.is_ascii_alphabetic() || ('\u{00C0}'..='\u{024F}').contains(&c) {
            latin += 1;
        }
    }

    if significant == 0 {
        return true;
    }
    latin as f64 / significant as f64 > LATIN_SCRIPT_RATIO
}

fn is_han(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c) || ('\u{3400}'..='\u{4DBF}').contains(&c)
}

fn compose<R: Rng + ?Sized>(
    country: &CountryNames,
    set: &NameSet,
    native: bool,
    rng: &mut R,
) -> Option<String> {
    let pool = if rng.gen_bool(0.5) {
        set.male
    } else {
        set.female
    };
    let first = pool.choose(rng)?;
    let last = set.last.choose(rng)?;

    if native && FAMILY_FIRST.contains(&country.country) {
        Some(format!("{last}{first}"))
    } else {
        Some(format!("{first} {last}"))
    }
}

/// Faker locale for a non-Latin script the name tables could not place
fn script_locale(name: &str) -> Option<Locale> {
    if is_latin_script(name) {
        return None;
    }
    if name.chars().any(is_kana) {
        Some(Locale::JaJp)
    } else if name.chars().any(is_han) {
        Some(Locale::ZhCn)
    } else if name.chars().any(is_arabic) {
        Some(Locale::ArSa)
    } else {
        None
    }
}

fn is_kana(c: char) -> bool {
    ('\u{3040}'..='\u{30FF}').contains(&c)
}

fn is_arabic(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

fn locale_name<R: Rng + ?Sized>(locale: Locale, rng: &mut R) -> String {
    with_fake_locale!(locale, data => Name(data).fake_with_rng(rng))
}
