//! Embedded gazetteer of real places

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// A real populated place
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Place {
    pub name: &'static str,
    pub country_code: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// Place name with coordinates, as returned for the coordinate-pair variant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country_code: String,
}

impl From<&Place> for GeoPoint {
    fn from(place: &Place) -> Self {
        Self {
            name: place.name.to_string(),
            latitude: place.latitude,
            longitude: place.longitude,
            country_code: place.country_code.to_string(),
        }
    }
}

macro_rules! place {
    ($name:expr, $cc:expr, $lat:expr, $lon:expr) => {
        Place {
            name: $name,
            country_code: $cc,
            latitude: $lat,
            longitude: $lon,
        }
    };
}

pub static GAZETTEER: &[Place] = &[
    place!("New York", "US", 40.712776, -74.005974),
    place!("Los Angeles", "US", 34.052235, -118.243683),
    place!("Chicago", "US", 41.878113, -87.629799),
    place!("Houston", "US", 29.760427, -95.369804),
    place!("Phoenix", "US", 33.448376, -112.074036),
    place!("Philadelphia", "US", 39.952583, -75.165222),
    place!("San Francisco", "US", 37.774929, -122.419418),
    place!("Seattle", "US", 47.606209, -122.332069),
    place!("Boston", "US", 42.360082, -71.058880),
    place!("Denver", "US", 39.739236, -104.990251),
    place!("Toronto", "CA", 43.653226, -79.383184),
    place!("Montreal", "CA", 45.501689, -73.567256),
    place!("Vancouver", "CA", 49.282729, -123.120738),
    place!("Mexico City", "MX", 19.432608, -99.133209),
    place!("São Paulo", "BR", -23.550520, -46.633308),
    place!("Buenos Aires", "AR", -34.603684, -58.381559),
    place!("Lima", "PE", -12.046374, -77.042793),
    place!("London", "GB", 51.507351, -0.127758),
    place!("Manchester", "GB", 53.480759, -2.242631),
    place!("Edinburgh", "GB", 55.953252, -3.188267),
    place!("Dublin", "IE", 53.349805, -6.260310),
    place!("Paris", "FR", 48.856613, 2.352222),
    place!("Lyon", "FR", 45.764043, 4.835659),
    place!("Marseille", "FR", 43.296482, 5.369780),
    place!("Berlin", "DE", 52.520008, 13.404954),
    place!("Munich", "DE", 48.135125, 11.581981),
    place!("Hamburg", "DE", 53.551085, 9.993682),
    place!("Amsterdam", "NL", 52.367573, 4.904139),
    place!("Brussels", "BE", 50.850346, 4.351721),
    place!("Madrid", "ES", 40.416775, -3.703790),
    place!("Barcelona", "ES", 41.385064, 2.173404),
    place!("Lisbon", "PT", 38.722252, -9.139337),
    place!("Rome", "IT", 41.902782, 12.496366),
    place!("Milan", "IT", 45.464204, 9.189982),
    place!("Vienna", "AT", 48.208174, 16.373819),
    place!("Zurich", "CH", 47.376887, 8.541694),
    place!("Stockholm", "SE", 59.329323, 18.068581),
    place!("Oslo", "NO", 59.913869, 10.752245),
    place!("Copenhagen", "DK", 55.676097, 12.568337),
    place!("Helsinki", "FI", 60.169856, 24.938379),
    place!("Warsaw", "PL", 52.229676, 21.012229),
    place!("Prague", "CZ", 50.075538, 14.437800),
    place!("Budapest", "HU", 47.497912, 19.040235),
    place!("Athens", "GR", 37.983810, 23.727539),
    place!("Istanbul", "TR", 41.008238, 28.978359),
    place!("Moscow", "RU", 55.755826, 37.617300),
    place!("Cairo", "EG", 30.044420, 31.235712),
    place!("Lagos", "NG", 6.524379, 3.379206),
    place!("Nairobi", "KE", -1.292066, 36.821946),
    place!("Cape Town", "ZA", -33.924869, 18.424055),
    place!("Dubai", "AE", 25.204849, 55.270783),
    place!("Riyadh", "SA", 24.713552, 46.675296),
    place!("Mumbai", "IN", 19.075984, 72.877656),
    place!("New Delhi", "IN", 28.613939, 77.209021),
    place!("Bangalore", "IN", 12.971599, 77.594563),
    place!("Singapore", "SG", 1.352083, 103.819836),
    place!("Bangkok", "TH", 13.756331, 100.501765),
    place!("Beijing", "CN", 39.904200, 116.407396),
    place!("Shanghai", "CN", 31.230416, 121.473701),
    place!("Hong Kong", "HK", 22.319304, 114.169361),
    place!("Taipei", "TW", 25.032969, 121.565418),
    place!("Seoul", "KR", 37.566535, 126.977969),
    place!("Tokyo", "JP", 35.676192, 139.650311),
    place!("Osaka", "JP", 34.693738, 135.502165),
    place!("Sydney", "AU", -33.868820, 151.209296),
    place!("Melbourne", "AU", -37.813628, 144.963058),
    place!("Auckland", "NZ", -36.848460, 174.763332),
];

/// Country names recognized as locations in text
pub static COUNTRY_NAMES: &[&str] = &[
    "Argentina", "Australia", "Austria", "Belgium", "Brazil", "Canada", "China",
    "Czech Republic", "Denmark", "Egypt", "Finland", "France", "Germany", "Greece",
    "Hungary", "India", "Ireland", "Italy", "Japan", "Kenya", "Mexico", "Netherlands",
    "New Zealand", "Nigeria", "Norway", "Peru", "Poland", "Portugal", "Russia",
    "Saudi Arabia", "Singapore", "South Africa", "South Korea", "Spain", "Sweden",
    "Switzerland", "Taiwan", "Thailand", "Turkey", "United Arab Emirates",
    "United Kingdom", "United States",
];

/// Pick a random place whose name differs from `exclude`
pub fn random_place<R: Rng + ?Sized>(rng: &mut R, exclude: Option<&str>) -> Option<&'static Place> {
    let candidates: Vec<&'static Place> = GAZETTEER
        .iter()
        .filter(|p| exclude.map_or(true, |e| !p.name.eq_ignore_ascii_case(e.trim())))
        .collect();
    candidates.choose(rng).copied()
}

/// Replace a single latitude or longitude value
///
/// Values with magnitude up to 90 are treated as latitudes. The output keeps
/// the original's number of decimal places.
pub fn replace_coordinate<R: Rng + ?Sized>(original: &str, rng: &mut R) -> Option<String> {
    let trimmed = original.trim();
    let value: f64 = trimmed.parse().ok()?;
    let precision = trimmed
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len());

    let place = random_place(rng, None)?;
    let replacement = if value.abs() <= 90.0 {
        place.latitude
    } else {
        place.longitude
    };

    Some(format!("{replacement:.precision$}"))
}
