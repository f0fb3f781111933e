//! Opportunistic coordinate extraction.
//!
//! Coordinates are never computed, only read: first from the listing's own
//! latitude/longitude fields, then from the metadata payload. Values outside
//! Earth bounds and the `(0, 0)` "not provided" sentinel are rejected.

use realty_listing_models::Listing;

use crate::config::CoordinateConfig;

/// Reads plausible `(lat, lon)` pairs from listings.
#[derive(Debug, Clone)]
pub struct CoordinateExtractor {
    latitude_fields: Vec<String>,
    longitude_fields: Vec<String>,
}

impl Default for CoordinateExtractor {
    fn default() -> Self {
        Self::new(&CoordinateConfig::default())
    }
}

impl CoordinateExtractor {
    #[must_use]
    pub fn new(config: &CoordinateConfig) -> Self {
        Self {
            latitude_fields: config.latitude_fields.clone(),
            longitude_fields: config.longitude_fields.clone(),
        }
    }

    /// Returns the listing's coordinates, or `None` if no plausible pair is
    /// present.
    #[must_use]
    pub fn coordinates(&self, listing: &Listing) -> Option<(f64, f64)> {
        let direct = listing.latitude.zip(listing.longitude);
        let from_metadata = first_number(listing, &self.latitude_fields)
            .zip(first_number(listing, &self.longitude_fields));

        [direct, from_metadata]
            .into_iter()
            .flatten()
            .find(|&(lat, lon)| is_plausible(lat, lon))
    }
}

fn first_number(listing: &Listing, keys: &[String]) -> Option<f64> {
    keys.iter().find_map(|key| listing.metadata_f64(key))
}

/// Whether a pair lies within Earth bounds and is not the `(0, 0)` sentinel.
#[must_use]
pub fn is_plausible(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
        && !(lat == 0.0 && lon == 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_listing_fields_first() {
        let l = Listing::new("1", "kufar")
            .with_coordinates(53.1315, 26.0071)
            .with_metadata("lat", serde_json::json!(10.0))
            .with_metadata("lng", serde_json::json!(10.0));
        assert_eq!(
            CoordinateExtractor::default().coordinates(&l),
            Some((53.1315, 26.0071))
        );
    }

    #[test]
    fn reads_metadata_numbers_and_strings() {
        let l = Listing::new("1", "kufar")
            .with_metadata("latitude", serde_json::json!("53.1315"))
            .with_metadata("lon", serde_json::json!(26.0071));
        assert_eq!(
            CoordinateExtractor::default().coordinates(&l),
            Some((53.1315, 26.0071))
        );
    }

    #[test]
    fn falls_back_to_metadata_when_fields_are_invalid() {
        let l = Listing::new("1", "kufar")
            .with_coordinates(0.0, 0.0)
            .with_metadata("lat", serde_json::json!(53.9))
            .with_metadata("lng", serde_json::json!(27.56));
        assert_eq!(
            CoordinateExtractor::default().coordinates(&l),
            Some((53.9, 27.56))
        );
    }

    #[test]
    fn rejects_zero_sentinel() {
        let l = Listing::new("1", "kufar").with_coordinates(0.0, 0.0);
        assert_eq!(CoordinateExtractor::default().coordinates(&l), None);
    }

    #[test]
    fn accepts_single_zero_component() {
        assert!(is_plausible(0.0, 26.0));
        assert!(is_plausible(51.47, 0.0));
    }

    #[test]
    fn rejects_out_of_bounds() {
        assert!(!is_plausible(91.0, 26.0));
        assert!(!is_plausible(53.0, -180.5));
        assert!(!is_plausible(f64::NAN, 26.0));
        assert!(is_plausible(-90.0, 180.0));
    }

    #[test]
    fn requires_both_components() {
        let l = Listing::new("1", "kufar").with_metadata("lat", serde_json::json!(53.1));
        assert_eq!(CoordinateExtractor::default().coordinates(&l), None);
    }

    #[test]
    fn custom_field_names() {
        let extractor = CoordinateExtractor::new(&CoordinateConfig {
            latitude_fields: vec!["y".to_string()],
            longitude_fields: vec!["x".to_string()],
        });
        let l = Listing::new("1", "realt")
            .with_metadata("y", serde_json::json!(52.09))
            .with_metadata("x", serde_json::json!(23.68));
        assert_eq!(extractor.coordinates(&l), Some((52.09, 23.68)));
    }
}
