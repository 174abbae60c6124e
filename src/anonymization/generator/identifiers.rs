//! Structured identifier generators
//!
//! Format-preserving where the original carries a format (digit grouping,
//! separators, case); canonical layouts otherwise. Checksums are not
//! computed.

use rand::seq::SliceRandom;
use rand::Rng;

const BASE58: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

fn digit<R: Rng + ?Sized>(rng: &mut R) -> char {
    char::from(b'0' + rng.gen_range(0..10u8))
}

fn nonzero_digit<R: Rng + ?Sized>(rng: &mut R) -> char {
    char::from(b'0' + rng.gen_range(1..10u8))
}

fn digits<R: Rng + ?Sized>(rng: &mut R, count: usize) -> String {
    (0..count).map(|_| digit(rng)).collect()
}

fn upper_letter<R: Rng + ?Sized>(rng: &mut R) -> char {
    char::from(b'A' + rng.gen_range(0..26u8))
}

/// Separator used by the original between digit groups, if any
fn separator(original: Option<&str>) -> Option<char> {
    original?
        .chars()
        .find(|c| !c.is_ascii_alphanumeric())
        .filter(|c| matches!(c, '-' | ' ' | '.'))
}

/// Replace every digit, keeping all other characters in place
///
/// The first digit of each run of digits is never zero.
pub fn phone_number<R: Rng + ?Sized>(original: Option<&str>, rng: &mut R) -> String {
    let template = original.unwrap_or("000-000-0000");
    let mut out = String::with_capacity(template.len());
    let mut previous_was_digit = false;

    for c in template.chars() {
        if c.is_ascii_digit() {
            out.push(if previous_was_digit {
                digit(rng)
            } else {
                nonzero_digit(rng)
            });
            previous_was_digit = true;
        } else {
            out.push(c);
            previous_was_digit = false;
        }
    }
    out
}

/// Sixteen-digit card number grouped like the original
pub fn credit_card<R: Rng + ?Sized>(original: Option<&str>, rng: &mut R) -> String {
    let groups: Vec<usize> = original
        .map(|o| {
            o.split(|c: char| !c.is_ascii_digit())
                .filter(|g| !g.is_empty())
                .map(str::len)
                .collect()
        })
        .filter(|g: &Vec<usize>| g.iter().sum::<usize>() == 16)
        .unwrap_or_else(|| vec![4, 4, 4, 4]);

    let issuer = ['4', '5'].choose(rng).copied().unwrap_or('4');
    let mut number = String::with_capacity(16);
    number.push(issuer);
    number.push_str(&digits(rng, 15));

    let sep = separator(original);
    let mut out = String::with_capacity(19);
    let mut offset = 0;
    for (i, len) in groups.iter().enumerate() {
        if i > 0 {
            if let Some(sep) = sep {
                out.push(sep);
            }
        }
        out.push_str(&number[offset..offset + len]);
        offset += len;
    }
    out
}

/// `ddd-dd-dddd`, keeping the original's separator
pub fn ssn<R: Rng + ?Sized>(original: Option<&str>, rng: &mut R) -> String {
    let area = loop {
        let area = rng.gen_range(1..900u16);
        if area != 666 {
            break area;
        }
    };
    let group = rng.gen_range(1..100u8);
    let serial = rng.gen_range(1..10000u16);
    join_groups(
        &[format!("{area:03}"), format!("{group:02}"), format!("{serial:04}")],
        original.map_or(Some('-'), |o| separator(Some(o))),
    )
}

/// `9dd-dd-dddd` with a middle group between 70 and 99
pub fn itin<R: Rng + ?Sized>(original: Option<&str>, rng: &mut R) -> String {
    join_groups(
        &[
            format!("9{}", digits(rng, 2)),
            rng.gen_range(70..=99u8).to_string(),
            rng.gen_range(1000..=9999u16).to_string(),
        ],
        original.map_or(Some('-'), |o| separator(Some(o))),
    )
}

fn join_groups(groups: &[String], sep: Option<char>) -> String {
    match sep {
        Some(sep) => groups.join(&sep.to_string()),
        None => groups.concat(),
    }
}

/// Between 8 and 17 digits, matching the original's length when it is in range
pub fn bank_number<R: Rng + ?Sized>(original: Option<&str>, rng: &mut R) -> String {
    let len = original
        .map(|o| o.chars().filter(char::is_ascii_digit).count())
        .filter(|n| (8..=17).contains(n))
        .unwrap_or_else(|| rng.gen_range(8..=17));
    let mut out = String::with_capacity(len);
    out.push(nonzero_digit(rng));
    out.push_str(&digits(rng, len - 1));
    out
}

/// Uppercase letter followed by 12 digits
pub fn driver_license<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}{}", upper_letter(rng), digits(rng, 12))
}

/// Uppercase letter followed by 8 digits
pub fn passport<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}{}", upper_letter(rng), digits(rng, 8))
}

/// `ML` followed by 8 digits
pub fn medical_license<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("ML{}", digits(rng, 8))
}

/// Country code, two check digits, then digits up to the original's length
///
/// Spaced originals are regrouped in blocks of four.
pub fn iban<R: Rng + ?Sized>(original: Option<&str>, rng: &mut R) -> String {
    let compact: String = original
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let country: String = compact
        .get(..2)
        .filter(|cc| cc.chars().all(|c| c.is_ascii_uppercase()))
        .unwrap_or("DE")
        .to_string();
    let len = if (15..=34).contains(&compact.len()) {
        compact.len()
    } else {
        22
    };

    let value = format!("{country}{}{}", digits(rng, 2), digits(rng, len - 4));
    if original.is_some_and(|o| o.trim().contains(' ')) {
        value
            .as_bytes()
            .chunks(4)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        value
    }
}

/// Random version 4 GUID, upper-cased when the original was
pub fn guid<R: Rng + ?Sized>(original: Option<&str>, rng: &mut R) -> String {
    let bytes: [u8; 16] = rng.gen();
    let value = uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .hyphenated()
        .to_string();

    let upper = original.is_some_and(|o| {
        o.chars().any(|c| c.is_ascii_uppercase()) && !o.chars().any(|c| c.is_ascii_lowercase())
    });
    if upper {
        value.to_uppercase()
    } else {
        value
    }
}

/// `1`, `3` or `bc1` prefix followed by 32 base58 characters
///
/// The original's prefix family is kept when recognizable.
pub fn crypto_address<R: Rng + ?Sized>(original: Option<&str>, rng: &mut R) -> String {
    let prefix = match original {
        Some(o) if o.starts_with("bc1") => "bc1",
        Some(o) if o.starts_with('3') => "3",
        Some(o) if o.starts_with('1') => "1",
        _ => ["1", "3", "bc1"].choose(rng).copied().unwrap_or("1"),
    };
    let body: String = (0..32)
        .filter_map(|_| BASE58.choose(rng).map(|&b| char::from(b)))
        .collect();
    format!("{prefix}{body}")
}
