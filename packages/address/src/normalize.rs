//! Free-text address normalization into a canonical (street, house) pair.
//!
//! The pipeline:
//! 1. Case-fold, fold `ё` to `е`, drop quotes and apartment suffixes
//! 2. Split into comma-separated segments and drop region tokens
//!    (`Брестская обл.`) from each, skipping segments left empty
//! 3. Find the first segment ending in a house number
//! 4. Take the street from the text before the number, or from the
//!    nearest preceding segment that is not a bare locality
//! 5. Strip street-type words (`ул.`, `проспект`, ...) and a leading
//!    locality (`г. Барановичи`, or a known name such as `Барановичи`)
//!    from the street
//!
//! Building numbers are kept in the house token (`"33/1"`), so distinct
//! buildings of one complex never share a key.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use realty_listing_models::ParsedAddress;
use regex::{Captures, Regex};

use crate::config::{AddressConfig, LocalityConfig};
use crate::locality::normalize_locality;
use crate::synonyms::{
    bare, is_locality_prefix, is_region_adjective, is_region_marker, is_street_noise,
    is_street_type,
};

/// Quotes and symbols that never carry address information.
static NOISE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[«»"“”„'`№()]"#).expect("valid regex"));

/// A period glued to the next word: "ул.Ленина" → "ул. Ленина".
static GLUED_PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.([^\s\d.])").expect("valid regex"));

/// Apartment / office suffix: "кв. 12", "квартира 5", "оф.3".
static APARTMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s,])(?:кв|квартира|пом|помещение|офис|оф)\.?\s*\d+\S*").expect("valid regex")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// House number at the end of a segment: digits, an optional letter
/// suffix, and an optional building number after `/`, `-`, `корпус`,
/// `к`, or `строение`.
///
/// Matches: "33", "33а", "33-а", "33 а", "33/1", "33-1", "33к1",
/// "33 корпус 1", "д. 33а".
static HOUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|\s)(?:(?:дом|д)\.?\s*)?(?P<number>\d{1,4})(?:\s*-?\s*(?P<letter>[а-яa-z]))?(?:\s*(?:/|\\|-|корпус|корп\.?|к\.?|строение|стр\.?)\s*(?P<building>\d{1,3}))?\s*$",
    )
    .expect("valid regex")
});

static DEFAULT_NORMALIZER: LazyLock<AddressNormalizer> =
    LazyLock::new(AddressNormalizer::default);

/// Normalizes an address with the default rules and locality set.
#[must_use]
pub fn normalize(raw: &str) -> ParsedAddress {
    DEFAULT_NORMALIZER.normalize(raw)
}

/// Parses raw address strings into [`ParsedAddress`] values.
#[derive(Debug, Clone)]
pub struct AddressNormalizer {
    letter_aliases: BTreeMap<char, char>,
    secondary_separator: String,
    /// Known locality names split into tokens, longest first.
    localities: Vec<Vec<String>>,
}

impl Default for AddressNormalizer {
    fn default() -> Self {
        Self::new(&AddressConfig::default()).with_localities(&LocalityConfig::default().known)
    }
}

impl AddressNormalizer {
    #[must_use]
    pub fn new(config: &AddressConfig) -> Self {
        Self {
            letter_aliases: config.letter_aliases.clone(),
            secondary_separator: config.secondary_separator.clone(),
            localities: Vec::new(),
        }
    }

    /// Strips these locality names when they open a street segment, so
    /// `"Барановичи Николы Теслы 33"` parses like
    /// `"Барановичи, ул. Николы Теслы, 33"`.
    #[must_use]
    pub fn with_localities(mut self, known: &[String]) -> Self {
        let mut localities: Vec<Vec<String>> = known
            .iter()
            .map(|name| {
                normalize_locality(name)
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|tokens| !tokens.is_empty())
            .collect();
        localities.sort_by_key(|tokens| std::cmp::Reverse(tokens.len()));
        self.localities = localities;
        self
    }

    /// Parses `raw` into a street and house token.
    ///
    /// Never fails: components that cannot be recognised are left empty.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> ParsedAddress {
        let text = prepare(raw);
        let segments: Vec<String> = segments(&text)
            .into_iter()
            .map(without_region)
            .filter(|s| !s.is_empty())
            .collect();

        for (idx, segment) in segments.iter().enumerate() {
            let Some(caps) = HOUSE_RE.captures(segment) else {
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };

            let house = self.canonical_house(&caps);
            let mut street = self.street_name(&segment[..whole.start()]);
            if street.is_empty() {
                street = segments[..idx]
                    .iter()
                    .rev()
                    .filter(|s| !is_locality_segment(s))
                    .map(|s| self.street_name(s))
                    .find(|s| !s.is_empty())
                    .unwrap_or_default();
            }

            log::trace!("normalized {raw:?} -> street={street:?} house={house:?}");
            return ParsedAddress { street, house };
        }

        // No house number anywhere: keep an explicitly typed street.
        let street = segments
            .iter()
            .find(|s| s.split_whitespace().any(is_street_type))
            .map(|s| self.street_name(s))
            .unwrap_or_default();

        ParsedAddress {
            street,
            house: String::new(),
        }
    }

    fn canonical_house(&self, caps: &Captures<'_>) -> String {
        let number = caps.name("number").map_or("", |m| m.as_str());
        let mut house = strip_leading_zeros(number).to_string();

        if let Some(letter) = caps.name("letter").and_then(|m| m.as_str().chars().next()) {
            house.push(self.letter_aliases.get(&letter).copied().unwrap_or(letter));
        }

        if let Some(building) = caps.name("building") {
            house.push_str(&self.secondary_separator);
            house.push_str(strip_leading_zeros(building.as_str()));
        }

        house
    }

    /// Extracts the street name from a segment (or the part of one before
    /// the house number).
    fn street_name(&self, segment: &str) -> String {
        let tokens: Vec<&str> = segment.split_whitespace().collect();

        let picked: Vec<&str> = match tokens.iter().position(|t| is_street_type(t)) {
            Some(pos) => {
                let after: Vec<&str> = tokens[pos + 1..]
                    .iter()
                    .copied()
                    .filter(|t| !is_street_type(t))
                    .collect();
                if after.is_empty() {
                    // Trailing type: "николы теслы ул."
                    self.without_locality_head(&tokens[..pos]).to_vec()
                } else {
                    after
                }
            }
            None => self.without_locality_head(&tokens).to_vec(),
        };

        picked
            .into_iter()
            .filter(|t| !is_street_noise(t))
            .map(|t| t.trim_matches(|c: char| c == '.' || c == '-'))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Drops a leading locality: a prefix word with its name
    /// ("г. барановичи") or a bare known name ("барановичи").
    fn without_locality_head<'a>(&self, tokens: &'a [&'a str]) -> &'a [&'a str] {
        match tokens.split_first() {
            Some((first, rest)) if is_locality_prefix(first) => {
                let len = self.known_locality_len(rest).unwrap_or(1);
                rest.get(len..).unwrap_or(&[])
            }
            _ => &tokens[self.known_locality_len(tokens).unwrap_or(0)..],
        }
    }

    /// Number of leading tokens spelling a known locality.
    fn known_locality_len(&self, tokens: &[&str]) -> Option<usize> {
        self.localities
            .iter()
            .find(|name| {
                name.len() <= tokens.len()
                    && name.iter().zip(tokens).all(|(part, token)| part == bare(token))
            })
            .map(Vec::len)
    }
}

fn strip_leading_zeros(digits: &str) -> &str {
    let stripped = digits.trim_start_matches('0');
    if stripped.is_empty() && !digits.is_empty() {
        "0"
    } else {
        stripped
    }
}

/// Case-folds and cleans raw address text.
#[must_use]
pub fn prepare(raw: &str) -> String {
    let lower = raw.to_lowercase().replace('ё', "е");
    let lower = NOISE_RE.replace_all(&lower, " ");
    let lower = GLUED_PERIOD_RE.replace_all(&lower, ". $1");
    let lower = APARTMENT_RE.replace_all(&lower, " ");
    WHITESPACE_RE.replace_all(&lower, " ").trim().to_string()
}

/// Splits prepared text into trimmed, non-empty segments.
#[must_use]
pub fn segments(text: &str) -> Vec<&str> {
    text.split([',', ';'])
        .map(|s| s.trim_matches(|c: char| c.is_whitespace() || c == '.'))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Removes region tokens from a segment: every region marker together
/// with the adjective in front of it (`"брестская обл."`, `"минский р-н"`).
/// Returns an empty string when the segment only named a region.
#[must_use]
pub fn without_region(segment: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for token in segment.split_whitespace() {
        if is_region_marker(token) {
            if kept.last().is_some_and(|prev| is_region_adjective(prev)) {
                kept.pop();
            }
        } else {
            kept.push(token);
        }
    }
    kept.join(" ")
}

/// Whether a segment is only a prefixed locality ("г. барановичи").
#[must_use]
pub fn is_locality_segment(segment: &str) -> bool {
    let mut tokens = segment.split_whitespace();
    tokens.next().is_some_and(is_locality_prefix)
        && !segment.split_whitespace().any(is_street_type)
}

/// Locality name introduced by a prefix inside a segment, e.g.
/// `"г. барановичи ул. ленина"` → `"барановичи"`.
#[must_use]
pub fn marked_locality(segment: &str) -> Option<String> {
    let tokens: Vec<&str> = segment.split_whitespace().collect();
    let start = tokens.iter().position(|t| is_locality_prefix(t))? + 1;
    let name: Vec<&str> = tokens[start..]
        .iter()
        .take_while(|t| !is_street_type(t) && !t.starts_with(|c: char| c.is_ascii_digit()))
        .map(|t| bare(t))
        .collect();

    if name.is_empty() {
        None
    } else {
        Some(name.join(" "))
    }
}
