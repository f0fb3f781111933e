//! City detection as an explicit, ordered list of strategies.
//!
//! The first strategy that yields a non-empty locality wins. The default
//! order is: explicit metadata fields, then a scan of the raw address for
//! a known locality, then a prefixed locality in the address text
//! (`"г. Барановичи"`).

use realty_listing_models::Listing;

use crate::config::LocalityConfig;
use crate::normalize::{marked_locality, prepare, segments, without_region};

/// Shortest address token accepted as an abbreviation of a known locality.
const MIN_PREFIX_CHARS: usize = 5;

/// One attempt at finding a listing's locality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalityStrategy {
    /// Explicit city value in the listing metadata under this key.
    MetadataField(String),
    /// A token of the raw address that equals (or abbreviates) a member of
    /// the reference locality set.
    KnownLocality,
    /// A locality introduced by a prefix word in the raw address.
    MarkedLocality,
}

/// Derives a normalized city identifier from a listing.
#[derive(Debug, Clone)]
pub struct LocalityExtractor {
    strategies: Vec<LocalityStrategy>,
    known: Vec<String>,
}

impl Default for LocalityExtractor {
    fn default() -> Self {
        Self::new(&LocalityConfig::default())
    }
}

impl LocalityExtractor {
    /// Builds the default strategy order from `config`.
    #[must_use]
    pub fn new(config: &LocalityConfig) -> Self {
        let mut strategies: Vec<LocalityStrategy> = config
            .metadata_fields
            .iter()
            .cloned()
            .map(LocalityStrategy::MetadataField)
            .collect();
        strategies.push(LocalityStrategy::KnownLocality);
        strategies.push(LocalityStrategy::MarkedLocality);

        Self::with_strategies(strategies, &config.known)
    }

    /// Builds an extractor with an explicit strategy order.
    #[must_use]
    pub fn with_strategies(strategies: Vec<LocalityStrategy>, known: &[String]) -> Self {
        let known = known
            .iter()
            .map(|name| normalize_locality(name))
            .filter(|name| !name.is_empty())
            .collect();

        Self { strategies, known }
    }

    #[must_use]
    pub fn strategies(&self) -> &[LocalityStrategy] {
        &self.strategies
    }

    /// Returns the listing's locality, or an empty string when none of the
    /// strategies finds one.
    #[must_use]
    pub fn city(&self, listing: &Listing) -> String {
        self.strategies
            .iter()
            .find_map(|strategy| self.attempt(strategy, listing))
            .unwrap_or_default()
    }

    fn attempt(&self, strategy: &LocalityStrategy, listing: &Listing) -> Option<String> {
        let found = match strategy {
            LocalityStrategy::MetadataField(key) => {
                listing.metadata_str(key).map(normalize_locality)
            }
            LocalityStrategy::KnownLocality => self.known_in(&listing.address),
            LocalityStrategy::MarkedLocality => {
                let text = prepare(&listing.address);
                segments(&text).into_iter().find_map(marked_locality)
            }
        };

        found.filter(|city| !city.is_empty())
    }

    /// First address token (in reading order) that matches the reference
    /// set, either exactly or as an abbreviation of at least
    /// [`MIN_PREFIX_CHARS`] characters.
    fn known_in(&self, address: &str) -> Option<String> {
        if self.known.is_empty() {
            return None;
        }

        let text = prepare(address);
        for segment in segments(&text) {
            let segment = without_region(segment);
            if segment.is_empty() {
                continue;
            }

            let padded = format!(" {segment} ");
            if let Some(name) = self
                .known
                .iter()
                .find(|name| name.contains(' ') && padded.contains(&format!(" {name} ")))
            {
                return Some(name.clone());
            }

            for token in segment.split_whitespace() {
                let token = token.trim_end_matches('.');
                if let Some(name) = self.known.iter().find(|name| {
                    *name == token
                        || (token.chars().count() >= MIN_PREFIX_CHARS && name.starts_with(token))
                }) {
                    return Some(name.clone());
                }
            }
        }

        None
    }
}

/// Case-folds a locality name and strips any prefix word (`"г. Минск"` →
/// `"минск"`).
#[must_use]
pub fn normalize_locality(name: &str) -> String {
    let text = prepare(name);
    let text = text.trim_matches(|c: char| c == '.' || c == ',' || c.is_whitespace());
    marked_locality(text).unwrap_or_else(|| text.to_string())
}
