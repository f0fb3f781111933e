//! Group key construction.
//!
//! Three fallback levels, tried in order:
//!
//! 1. `(city, street, house)` when the address parses completely
//! 2. `(city, coordinate bucket)` when the listing carries plausible GPS data
//! 3. `(city, raw address)` otherwise, which only merges byte-identical
//!    addresses

use realty_address::{AddressNormalizer, CoordinateExtractor, LocalityExtractor};
use realty_listing_models::{GroupKey, Listing};

use crate::config::GroupingConfig;

/// Derives the clustering key of a listing.
#[derive(Debug, Clone)]
pub struct GroupKeyBuilder {
    normalizer: AddressNormalizer,
    localities: LocalityExtractor,
    coordinates: CoordinateExtractor,
    precision: u32,
}

impl Default for GroupKeyBuilder {
    fn default() -> Self {
        Self::new(&GroupingConfig::default())
    }
}

impl GroupKeyBuilder {
    #[must_use]
    pub fn new(config: &GroupingConfig) -> Self {
        Self {
            normalizer: AddressNormalizer::new(&config.address)
                .with_localities(&config.locality.known),
            localities: LocalityExtractor::new(&config.locality),
            coordinates: CoordinateExtractor::new(&config.coordinates),
            precision: config.coordinate_precision,
        }
    }

    #[must_use]
    pub const fn precision(&self) -> u32 {
        self.precision
    }

    #[must_use]
    pub const fn normalizer(&self) -> &AddressNormalizer {
        &self.normalizer
    }

    #[must_use]
    pub const fn coordinate_extractor(&self) -> &CoordinateExtractor {
        &self.coordinates
    }

    #[must_use]
    pub fn key(&self, listing: &Listing) -> GroupKey {
        let locality = self.localities.city(listing);
        let parsed = self.normalizer.normalize(&listing.address);

        if parsed.is_complete() {
            return GroupKey::Address {
                locality,
                street: parsed.street,
                house: parsed.house,
            };
        }

        if let Some((lat, lon)) = self.coordinates.coordinates(listing) {
            let (lat_bucket, lon_bucket) = coordinate_bucket(lat, lon, self.precision);
            return GroupKey::Coordinates {
                locality,
                lat_bucket,
                lon_bucket,
                precision: self.precision,
            };
        }

        GroupKey::RawAddress {
            locality,
            raw: listing.address.clone(),
        }
    }
}

/// Rounds a coordinate pair to `precision` decimal places, returned as
/// integers scaled by `10^precision` so keys compare exactly.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn coordinate_bucket(lat: f64, lon: f64, precision: u32) -> (i64, i64) {
    let scale = 10_f64.powi(precision as i32);
    ((lat * scale).round() as i64, (lon * scale).round() as i64)
}
