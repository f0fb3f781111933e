//! Street-type, locality-prefix and region token tables.
//!
//! All entries are lowercase with `ё` folded to `е` and without a trailing
//! period, matching the form tokens take after [`crate::normalize::prepare`]
//! and [`bare`].

use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Street-type words and their abbreviations (Russian, Belarusian, English).
static STREET_TYPES: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    BTreeSet::from([
        // Russian
        "улица",
        "ул",
        "проспект",
        "пр-т",
        "пр-кт",
        "просп",
        "пр",
        "переулок",
        "пер",
        "бульвар",
        "б-р",
        "бул",
        "проезд",
        "пр-д",
        "шоссе",
        "ш",
        "площадь",
        "пл",
        "набережная",
        "наб",
        "тракт",
        "тупик",
        "туп",
        "аллея",
        "микрорайон",
        "мкр",
        "мкрн",
        "мкр-н",
        "квартал",
        "кв-л",
        // Belarusian
        "вуліца",
        "вул",
        "праспект",
        "завулак",
        "зав",
        // English
        "street",
        "st",
        "avenue",
        "ave",
        "av",
        "lane",
        "ln",
        "boulevard",
        "blvd",
        "road",
        "rd",
    ])
});

/// Words that precede a street name but are not part of it ("им. Ленина").
static STREET_NOISE: &[&str] = &["им", "имени"];

/// Words that introduce a locality name ("г. Барановичи", "аг. Новосады").
static LOCALITY_PREFIXES: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    BTreeSet::from([
        "г",
        "гор",
        "город",
        "горад",
        "гп",
        "пгт",
        "д",
        "дер",
        "деревня",
        "аг",
        "агрогородок",
        "п",
        "пос",
        "поселок",
        "с",
        "село",
        "city",
    ])
});

/// Tokens marking a region, district or country segment.
static REGION_MARKERS: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    BTreeSet::from([
        "обл",
        "область",
        "вобл",
        "вобласць",
        "район",
        "р-н",
        "раён",
        "сельсовет",
        "с/с",
        "беларусь",
        "belarus",
        "республика",
        "region",
        "district",
    ])
});

/// Adjective endings of region names ("брестская", "минский", "брэсцкая").
static REGION_ADJECTIVE_ENDINGS: &[&str] = &["ая", "ий", "ый", "ой", "кі", "ае"];

/// Strips trailing periods so `"ул."` and `"ул"` compare equal.
#[must_use]
pub fn bare(token: &str) -> &str {
    token.trim_end_matches('.')
}

#[must_use]
pub fn is_street_type(token: &str) -> bool {
    STREET_TYPES.contains(bare(token))
}

#[must_use]
pub fn is_street_noise(token: &str) -> bool {
    STREET_NOISE.contains(&bare(token))
}

#[must_use]
pub fn is_locality_prefix(token: &str) -> bool {
    LOCALITY_PREFIXES.contains(bare(token))
}

#[must_use]
pub fn is_region_marker(token: &str) -> bool {
    REGION_MARKERS.contains(bare(token))
}

/// Whether `token` reads as the adjective of a region name, e.g. the
/// `"брестская"` in `"брестская обл."`.
#[must_use]
pub fn is_region_adjective(token: &str) -> bool {
    let token = bare(token);
    !is_street_type(token)
        && !is_locality_prefix(token)
        && !token.starts_with(|c: char| c.is_ascii_digit())
        && REGION_ADJECTIVE_ENDINGS.iter().any(|ending| token.ends_with(ending))
}
