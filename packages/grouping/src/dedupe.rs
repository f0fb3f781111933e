//! Removal of exact and near-exact re-posts before grouping.
//!
//! Agencies routinely publish the same flat several times, sometimes on
//! several marketplaces, with cosmetic differences in price or area. Two
//! listings are considered the same ad when either:
//!
//! - their signatures match (vendor, price rounded to 500, area rounded
//!   to 0.5, floor and the first three photos), or
//! - they share a vendor and a house number, their prices differ by less
//!   than 5% and their areas by less than 1 m².
//!
//! The first occurrence wins and input order is kept.

use std::collections::BTreeMap;

use realty_address::AddressNormalizer;
use realty_listing_models::Listing;

const PRICE_BUCKET: f64 = 500.0;
const PHOTOS_IN_SIGNATURE: usize = 3;
const MAX_PRICE_DIFF_RATIO: f64 = 0.05;
const MAX_AREA_DIFF: f64 = 1.0;

fn md5_hex(data: &str) -> String {
    let mut context = md5::Context::new();
    context.consume(data.as_bytes());
    format!("{:x}", context.finalize())
}

#[allow(clippy::cast_possible_truncation)]
fn price_bucket(price: Option<f64>) -> i64 {
    price
        .filter(|p| p.is_finite() && *p > 0.0)
        .map_or(0, |p| ((p / PRICE_BUCKET).round() * PRICE_BUCKET) as i64)
}

fn area_bucket(area: Option<f64>) -> f64 {
    area.filter(|a| a.is_finite() && *a > 0.0)
        .map_or(0.0, |a| (a * 2.0).round() / 2.0)
}

/// Hex digest identifying a listing up to cosmetic differences.
#[must_use]
pub fn listing_signature(listing: &Listing) -> String {
    let vendor = listing.vendor().unwrap_or_default().to_lowercase();
    let price = price_bucket(listing.price);
    let area = area_bucket(listing.area);
    let floor = listing.floor.as_deref().unwrap_or_default();

    let photos = if listing.photos.is_empty() {
        md5_hex(&format!("{}|{area:.1}|{floor}", listing.title))
    } else {
        let sample: Vec<&str> = listing
            .photos
            .iter()
            .take(PHOTOS_IN_SIGNATURE)
            .map(String::as_str)
            .collect();
        md5_hex(&sample.join("|"))
    };

    md5_hex(&format!("{vendor}|{price}|{area:.1}|{floor}|{photos}"))
}

struct Kept<'a> {
    listing: &'a Listing,
    vendor: Option<String>,
    house: String,
}

impl Kept<'_> {
    fn same_offer(&self, vendor: &str, house: &str, price: f64, area: f64) -> bool {
        if self.vendor.as_deref() != Some(vendor) || self.house.is_empty() || self.house != house {
            return false;
        }

        let other_price = self.listing.price.unwrap_or(0.0);
        if !(price > 0.0 && other_price > 0.0) {
            return false;
        }

        let price_diff = (price - other_price).abs() / price.max(other_price);
        let area_diff = (area - self.listing.area.unwrap_or(0.0)).abs();
        price_diff < MAX_PRICE_DIFF_RATIO && area_diff < MAX_AREA_DIFF
    }
}

/// Drops listings that repeat an earlier listing in `listings`.
#[must_use]
pub fn dedupe_by_signature(listings: &[Listing], normalizer: &AddressNormalizer) -> Vec<Listing> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    let mut kept: Vec<Kept<'_>> = Vec::new();

    for listing in listings {
        let signature = listing_signature(listing);
        if let Some(original) = seen.get(&signature) {
            log::debug!(
                "Duplicate signature: {} same as {original}",
                listing.external_id
            );
            continue;
        }

        let vendor = listing.vendor().map(str::to_lowercase);
        let house = normalizer.normalize(&listing.address).house;

        if let Some(vendor) = vendor.as_deref()
            && !house.is_empty()
        {
            let price = listing.price.unwrap_or(0.0);
            let area = listing.area.unwrap_or(0.0);
            if let Some(original) = kept
                .iter()
                .find(|k| k.same_offer(vendor, &house, price, area))
            {
                log::debug!(
                    "Duplicate offer: {} same as {} (vendor={vendor}, house={house})",
                    listing.external_id,
                    original.listing.external_id
                );
                continue;
            }
        }

        seen.insert(signature, &listing.external_id);
        kept.push(Kept {
            listing,
            vendor,
            house,
        });
    }

    let removed = listings.len() - kept.len();
    if removed > 0 {
        log::info!(
            "Removed {removed} duplicates from {} listings",
            listings.len()
        );
    }

    kept.into_iter().map(|k| k.listing.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad(id: &str) -> Listing {
        Listing::new(id, "kufar")
            .with_address("Барановичи, ул. Николы Теслы, 33")
            .with_price(45_000.0)
            .with_area(48.2)
            .with_metadata("agency", serde_json::json!("Твоя Столица"))
    }

    fn ids(listings: &[Listing]) -> Vec<&str> {
        listings.iter().map(|l| l.external_id.as_str()).collect()
    }

    #[test]
    fn signature_ignores_cosmetic_differences() {
        let a = ad("1").with_price(45_100.0).with_area(48.1);
        let b = ad("2").with_price(44_900.0).with_area(48.2);
        assert_eq!(listing_signature(&a), listing_signature(&b));
        assert_eq!(listing_signature(&a).len(), 32);
    }

    #[test]
    fn signature_depends_on_photos() {
        let mut a = ad("1");
        a.photos = vec!["p1.jpg".to_string(), "p2.jpg".to_string()];
        let mut b = ad("2");
        b.photos = vec!["p3.jpg".to_string()];
        assert_ne!(listing_signature(&a), listing_signature(&b));
    }

    #[test]
    fn signature_uses_only_first_three_photos() {
        let photos: Vec<String> = (1..=5).map(|i| format!("p{i}.jpg")).collect();
        let mut a = ad("1");
        a.photos = photos.clone();
        let mut b = ad("2");
        b.photos = photos[..3].to_vec();
        assert_eq!(listing_signature(&a), listing_signature(&b));
    }

    #[test]
    fn signature_falls_back_to_title() {
        let mut a = ad("1");
        a.title = "2-комнатная квартира".to_string();
        let mut b = ad("2");
        b.title = "3-комнатная квартира".to_string();
        assert_ne!(listing_signature(&a), listing_signature(&b));
    }

    #[test]
    fn drops_repeated_signature_keeping_first() {
        let input = vec![ad("1"), ad("2"), ad("3").with_price(80_000.0)];
        let kept = dedupe_by_signature(&input, &AddressNormalizer::default());
        assert_eq!(ids(&kept), vec!["1", "3"]);
    }

    #[test]
    fn drops_same_vendor_house_close_price_and_area() {
        // 3% cheaper, half a square metre smaller: outside the signature
        // buckets but the same offer
        let input = vec![
            ad("1"),
            ad("2")
                .with_price(43_650.0)
                .with_area(47.7)
                .with_metadata("agency", serde_json::json!("твоя столица")),
        ];
        assert_ne!(listing_signature(&input[0]), listing_signature(&input[1]));
        let kept = dedupe_by_signature(&input, &AddressNormalizer::default());
        assert_eq!(ids(&kept), vec!["1"]);
    }

    #[test]
    fn keeps_different_house() {
        let input = vec![
            ad("1"),
            ad("2")
                .with_price(43_650.0)
                .with_address("Барановичи, ул. Николы Теслы, 35"),
        ];
        let kept = dedupe_by_signature(&input, &AddressNormalizer::default());
        assert_eq!(ids(&kept), vec!["1", "2"]);
    }

    #[test]
    fn keeps_large_price_difference() {
        let input = vec![ad("1"), ad("2").with_price(40_000.0)];
        let kept = dedupe_by_signature(&input, &AddressNormalizer::default());
        assert_eq!(ids(&kept), vec!["1", "2"]);
    }

    #[test]
    fn vendor_rule_requires_vendor() {
        let mut a = ad("1");
        a.metadata.clear();
        let mut b = ad("2").with_price(43_650.0);
        b.metadata.clear();
        let kept = dedupe_by_signature(&[a, b], &AddressNormalizer::default());
        assert_eq!(ids(&kept), vec!["1", "2"]);
    }

    #[test]
    fn empty_input() {
        assert!(dedupe_by_signature(&[], &AddressNormalizer::default()).is_empty());
    }
}
