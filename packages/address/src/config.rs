//! Tunable heuristics for address, locality and coordinate extraction.
//!
//! Every struct deserializes with defaults for missing fields, so a TOML
//! file only needs to list the values it overrides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// House-number normalization rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressConfig {
    /// Latin house letters folded into the Cyrillic letter they look like
    /// once lowercased, so `"33a"` and `"33а"` compare equal. Keys are
    /// lowercase: `"5B"` folds to `"5в"` like `"5В"`.
    pub letter_aliases: BTreeMap<char, char>,
    /// Separator placed between house and building number in the canonical
    /// house token (`"33/1"`).
    pub secondary_separator: String,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            letter_aliases: BTreeMap::from([
                ('a', 'а'),
                ('b', 'в'),
                ('c', 'с'),
                ('e', 'е'),
                ('h', 'н'),
                ('k', 'к'),
                ('m', 'м'),
                ('o', 'о'),
                ('p', 'р'),
                ('t', 'т'),
                ('x', 'х'),
                ('y', 'у'),
            ]),
            secondary_separator: "/".to_string(),
        }
    }
}

/// Where to look for a listing's city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalityConfig {
    /// Metadata keys holding an explicit city, tried in order.
    pub metadata_fields: Vec<String>,
    /// Reference locality set scanned for in the raw address.
    pub known: Vec<String>,
}

impl Default for LocalityConfig {
    fn default() -> Self {
        Self {
            metadata_fields: vec!["city".to_string(), "locality".to_string()],
            known: [
                "барановичи",
                "минск",
                "брест",
                "витебск",
                "гомель",
                "гродно",
                "могилев",
                "бобруйск",
                "пинск",
                "орша",
                "мозырь",
                "лида",
                "борисов",
                "солигорск",
                "молодечно",
                "полоцк",
                "новополоцк",
                "жлобин",
                "слуцк",
                "кобрин",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

/// Metadata keys carrying coordinates, tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateConfig {
    pub latitude_fields: Vec<String>,
    pub longitude_fields: Vec<String>,
}

impl Default for CoordinateConfig {
    fn default() -> Self {
        Self {
            latitude_fields: vec!["lat".to_string(), "latitude".to_string()],
            longitude_fields: vec![
                "lng".to_string(),
                "lon".to_string(),
                "longitude".to_string(),
            ],
        }
    }
}
