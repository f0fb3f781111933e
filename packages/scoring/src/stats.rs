//! Price-per-area figures and medians.

use realty_listing_models::Listing;

/// Market median used when no listing has both a price and an area, so
/// that downstream ratios stay defined.
pub const DEFAULT_MARKET_MEDIAN: f64 = 1.0;

/// `price / area`, or `None` when either is missing, non-finite or not
/// positive.
#[must_use]
pub fn price_per_area(listing: &Listing) -> Option<f64> {
    let price = listing.price.filter(|p| p.is_finite() && *p > 0.0)?;
    let area = listing.area.filter(|a| a.is_finite() && *a > 0.0)?;
    Some(price / area)
}

/// Median of `values`; the mean of the two middle values for even
/// lengths. `None` for an empty slice.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some(f64::midpoint(sorted[mid - 1], sorted[mid]))
    } else {
        Some(sorted[mid])
    }
}

/// Median price-per-area over every listing that defines one, or
/// [`DEFAULT_MARKET_MEDIAN`].
#[must_use]
pub fn market_median<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> f64 {
    let values: Vec<f64> = listings.into_iter().filter_map(price_per_area).collect();
    median(&values).unwrap_or(DEFAULT_MARKET_MEDIAN)
}
