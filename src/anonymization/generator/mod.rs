//! Synthetic value generation
//!
//! [`SyntheticGenerator::generate`] produces a type-appropriate substitute
//! for an entity. When a fingerprint is supplied the random source is
//! seeded from it, so the same fingerprint always yields the same value;
//! without one the generator draws from OS entropy.
//!
//! Generators never return the original value: a repeat is regenerated a
//! bounded number of times before the generic placeholder is used.

/// Evaluate `$body` with `$data` bound to the `fake` locale data for `$locale`
macro_rules! with_fake_locale {
    ($locale:expr, $data:ident => $body:expr) => {
        match $locale {
            $crate::anonymization::generator::Locale::EnUs => {
                let $data = ::fake::locales::EN;
                $body
            }
            $crate::anonymization::generator::Locale::FrFr => {
                let $data = ::fake::locales::FR_FR;
                $body
            }
            $crate::anonymization::generator::Locale::ZhCn => {
                let $data = ::fake::locales::ZH_CN;
                $body
            }
            $crate::anonymization::generator::Locale::ZhTw => {
                let $data = ::fake::locales::ZH_TW;
                $body
            }
            $crate::anonymization::generator::Locale::JaJp => {
                let $data = ::fake::locales::JA_JP;
                $body
            }
            $crate::anonymization::generator::Locale::ArSa => {
                let $data = ::fake::locales::AR_SA;
                $body
            }
            $crate::anonymization::generator::Locale::PtBr => {
                let $data = ::fake::locales::PT_BR;
                $body
            }
        }
    };
}

pub mod identifiers;
pub mod location;
pub mod names;
pub mod network;

use crate::anonymization::models::EntityType;
use chrono::NaiveDate;
use fake::faker::address::raw::{BuildingNumber, CityName, StreetName};
use fake::faker::internet::raw::{DomainSuffix, SafeEmail};
use fake::faker::lorem::raw::Word;
use fake::locales::EN;
use fake::Fake;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub use location::GeoPoint;

/// Regeneration attempts when the output equals the original
pub const MAX_ATTEMPTS: usize = 5;

/// Replacement pool for nationality, religious or political groups
const NRP_GROUPS: [&str; 4] = ["Group A", "Organization B", "Community C", "Association D"];

/// Locale used by the faker-backed generators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    EnUs,
    FrFr,
    ZhCn,
    ZhTw,
    JaJp,
    ArSa,
    PtBr,
}

impl Locale {
    /// Resolve a locale tag such as `en_US` or `zh-TW`
    ///
    /// Unknown tags resolve to `EnUs`.
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag.trim().replace('-', "_").to_lowercase();
        match normalized.as_str() {
            "zh_tw" | "zh_hk" | "zh_hant" => Self::ZhTw,
            t if t.starts_with("zh") => Self::ZhCn,
            t if t.starts_with("fr") => Self::FrFr,
            t if t.starts_with("ja") => Self::JaJp,
            t if t.starts_with("ar") => Self::ArSa,
            t if t.starts_with("pt") => Self::PtBr,
            _ => Self::EnUs,
        }
    }

    /// Locale whose faker matches a detected name origin
    pub fn for_country(country: &str) -> Option<Self> {
        match country {
            "US" | "GB" => Some(Self::EnUs),
            "FR" => Some(Self::FrFr),
            "CN" => Some(Self::ZhCn),
            "TW" => Some(Self::ZhTw),
            "JP" => Some(Self::JaJp),
            "SA" => Some(Self::ArSa),
            "BR" => Some(Self::PtBr),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::FrFr => "fr_FR",
            Self::ZhCn => "zh_CN",
            Self::ZhTw => "zh_TW",
            Self::JaJp => "ja_JP",
            Self::ArSa => "ar_SA",
            Self::PtBr => "pt_BR",
        }
    }
}

/// Generated substitute plus the reason the generic placeholder was used, if it was
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub value: String,
    pub fallback: Option<String>,
}

/// Type-aware synthetic value generator
///
/// Stateless apart from its locale; every call builds its own random source.
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    locale: Locale,
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new(Locale::EnUs)
    }
}

impl SyntheticGenerator {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Generate a substitute for `entity_type`
    pub fn generate(
        &self,
        entity_type: &EntityType,
        original: Option<&str>,
        fingerprint: Option<&str>,
    ) -> Generated {
        let mut rng = rng_for(fingerprint);

        for _ in 0..MAX_ATTEMPTS {
            let value = self.dispatch(entity_type, original, &mut rng);
            if original.map_or(true, |o| o != value) {
                return Generated {
                    value,
                    fallback: None,
                };
            }
        }

        tracing::debug!(
            entity_type = %entity_type,
            "Generator kept repeating the original, using placeholder"
        );
        Generated {
            value: placeholder(&mut rng),
            fallback: Some(format!(
                "generator repeated the original value {MAX_ATTEMPTS} times"
            )),
        }
    }

    /// Real place with coordinates, for structured location records
    pub fn location_with_coordinates(&self, fingerprint: Option<&str>) -> GeoPoint {
        let mut rng = rng_for(fingerprint);
        match location::random_place(&mut rng, None) {
            Some(place) => GeoPoint::from(place),
            None => GeoPoint {
                name: self.city(&mut rng),
                latitude: rng.gen_range(-90.0..=90.0),
                longitude: rng.gen_range(-180.0..=180.0),
                country_code: "US".to_string(),
            },
        }
    }

    fn dispatch(&self, entity_type: &EntityType, original: Option<&str>, rng: &mut StdRng) -> String {
        match entity_type {
            EntityType::Person => names::generate_name(original, self.locale, rng),
            EntityType::EmailAddress => SafeEmail(EN).fake_with_rng(rng),
            EntityType::PhoneNumber => identifiers::phone_number(original, rng),
            EntityType::CreditCard => identifiers::credit_card(original, rng),
            EntityType::UsSsn => identifiers::ssn(original, rng),
            EntityType::UsBankNumber => identifiers::bank_number(original, rng),
            EntityType::UsDriverLicense => identifiers::driver_license(rng),
            EntityType::UsItin => identifiers::itin(original, rng),
            EntityType::UsPassport => identifiers::passport(rng),
            EntityType::IpAddress => network::generate_ip(original, rng),
            EntityType::Location => match location::random_place(rng, original) {
                Some(place) => place.name.to_string(),
                None => self.city(rng),
            },
            EntityType::StreetAddress => self.street_address(rng),
            EntityType::DateTime => date(original, rng),
            EntityType::Nrp => NRP_GROUPS.choose(rng).copied().unwrap_or("Group A").to_string(),
            EntityType::MedicalLicense => identifiers::medical_license(rng),
            EntityType::Url => url(original, rng),
            EntityType::IbanCode => identifiers::iban(original, rng),
            EntityType::Crypto => identifiers::crypto_address(original, rng),
            EntityType::Guid => identifiers::guid(original, rng),
            EntityType::Coordinate => original
                .and_then(|o| location::replace_coordinate(o, rng))
                .unwrap_or_else(|| {
                    let latitude: f64 = rng.gen_range(-90.0..=90.0);
                    format!("{latitude:.6}")
                }),
            EntityType::Custom(_) => placeholder(rng),
        }
    }

    fn city(&self, rng: &mut StdRng) -> String {
        with_fake_locale!(self.locale, data => CityName(data).fake_with_rng(rng))
    }

    fn street_address(&self, rng: &mut StdRng) -> String {
        let (number, street): (String, String) = with_fake_locale!(self.locale, data => (
            BuildingNumber(data).fake_with_rng(rng),
            StreetName(data).fake_with_rng(rng),
        ));
        format!("{number} {street}")
    }
}

/// Seeded random source for a fingerprint, or entropy when there is none
///
/// The seed is the first 16 hex characters of the fingerprint read as a `u64`.
pub fn rng_for(fingerprint: Option<&str>) -> StdRng {
    fingerprint
        .and_then(|f| f.get(..16))
        .and_then(|prefix| u64::from_str_radix(prefix, 16).ok())
        .map(StdRng::seed_from_u64)
        .unwrap_or_else(StdRng::from_entropy)
}

/// Generic labeled placeholder, `<REDACTED_nnnnnn>`
pub fn placeholder<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("<REDACTED_{}>", rng.gen_range(100_000..=999_999u32))
}

/// Date between 1950 and 2005, in the original's layout when recognizable
fn date<R: Rng + ?Sized>(original: Option<&str>, rng: &mut R) -> String {
    let start = NaiveDate::from_ymd_opt(1950, 1, 1);
    let date = start
        .and_then(|s| s.checked_add_days(chrono::Days::new(rng.gen_range(0..20_089))))
        .unwrap_or(NaiveDate::MIN);

    let format = match original.map(str::trim) {
        Some(o) if o.len() == 10 && o.as_bytes()[4] == b'-' => "%Y-%m-%d",
        Some(o) if o.contains('/') => "%m/%d/%Y",
        Some(o) if o.contains('-') => "%m-%d-%Y",
        Some(o) if o.starts_with(|c: char| c.is_ascii_alphabetic()) => "%B %-d, %Y",
        _ => "%Y-%m-%d",
    };
    date.format(format).to_string()
}

/// URL keeping the original's scheme, `www.` prefix and presence of a path
fn url<R: Rng + ?Sized>(original: Option<&str>, rng: &mut R) -> String {
    let original = original.unwrap_or("https://");
    let scheme = if original.starts_with("http://") {
        "http://"
    } else if original.starts_with("www.") {
        ""
    } else {
        "https://"
    };

    let name: String = Word(EN).fake_with_rng(rng);
    let suffix: String = DomainSuffix(EN).fake_with_rng(rng);
    let mut url = format!("{scheme}www.{name}.{suffix}");

    let has_path = original
        .split_once("://")
        .map_or(original, |(_, rest)| rest)
        .contains('/');
    if has_path {
        let path: String = Word(EN).fake_with_rng(rng);
        url.push('/');
        url.push_str(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const FINGERPRINT: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    fn generator() -> SyntheticGenerator {
        SyntheticGenerator::default()
    }

    #[test_case("en_US", Locale::EnUs)]
    #[test_case("fr-FR", Locale::FrFr)]
    #[test_case("zh_CN", Locale::ZhCn)]
    #[test_case("zh-TW", Locale::ZhTw)]
    #[test_case("ja_JP", Locale::JaJp)]
    #[test_case("ar-SA", Locale::ArSa)]
    #[test_case("pt_BR", Locale::PtBr)]
    #[test_case("xx_YY", Locale::EnUs)]
    fn test_locale_from_tag(tag: &str, expected: Locale) {
        assert_eq!(Locale::from_tag(tag), expected);
    }

    #[test]
    fn test_fingerprint_seeding_is_deterministic() {
        let generator = generator();
        for entity_type in EntityType::BUILTIN.iter() {
            let a = generator.generate(entity_type, Some("seed value"), Some(FINGERPRINT));
            let b = generator.generate(entity_type, Some("seed value"), Some(FINGERPRINT));
            assert_eq!(a, b, "{entity_type}");
        }
    }

    #[test]
    fn test_never_returns_original() {
        let generator = generator();
        let originals = [
            (EntityType::Nrp, "Group A"),
            (EntityType::Location, "Paris"),
            (EntityType::PhoneNumber, "555-123-4567"),
            (EntityType::UsSsn, "123-45-6789"),
        ];
        for (entity_type, original) in originals {
            for _ in 0..25 {
                let generated = generator.generate(&entity_type, Some(original), None);
                assert_ne!(generated.value, original);
            }
        }
    }

    #[test]
    fn test_unavoidable_repeat_uses_placeholder() {
        // The only private /8 network is 10.0.0.0/8 itself
        let generated = generator().generate(&EntityType::IpAddress, Some("10.0.0.0/8"), None);
        assert!(generated.value.starts_with("<REDACTED_"));
        assert!(generated.fallback.is_some());
    }

    #[test]
    fn test_custom_type_uses_placeholder() {
        let generated = generator().generate(
            &EntityType::Custom("EMPLOYEE_ID".to_string()),
            Some("EMP-123456"),
            None,
        );
        assert!(generated.value.starts_with("<REDACTED_"));
        assert_eq!(generated.value.len(), "<REDACTED_123456>".len());
        assert!(generated.fallback.is_none());
    }

    #[test]
    fn test_email_shape() {
        let generated = generator().generate(&EntityType::EmailAddress, Some("john@example.com"), None);
        assert!(generated.value.contains('@'));
    }

    #[test_case("2024-01-15", 10, '-' ; "iso")]
    #[test_case("01/15/2024", 10, '/' ; "slashed")]
    fn test_date_layout(original: &str, len: usize, sep: char) {
        let generated = generator().generate(&EntityType::DateTime, Some(original), None);
        assert_eq!(generated.value.len(), len);
        assert!(generated.value.contains(sep));
    }

    #[test]
    fn test_url_keeps_scheme() {
        let generated = generator().generate(&EntityType::Url, Some("http://example.com/a"), None);
        assert!(generated.value.starts_with("http://www."));
        assert_eq!(generated.value.matches('/').count(), 3);
    }

    #[test]
    fn test_location_with_coordinates_is_seeded() {
        let a = generator().location_with_coordinates(Some(FINGERPRINT));
        let b = generator().location_with_coordinates(Some(FINGERPRINT));
        assert_eq!(a, b);
        assert!(a.latitude.abs() <= 90.0);
    }

    #[test]
    fn test_rng_for_short_fingerprint_uses_entropy() {
        // Falls back silently rather than panicking
        let _ = rng_for(Some("abc")).gen::<u64>();
    }
}
