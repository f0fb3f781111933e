//! Human-readable house summaries for notifications and reports.
//!
//! A summary lists the best-scoring clusters with their price range and
//! two indicators: how far below the market the house is priced, and
//! whether its listings agree on price.

use realty_listing_models::{Cluster, WeightVector};
use serde::Serialize;

use crate::score::score_clusters;

/// Houses priced more than this fraction below the market median are
/// flagged.
pub const BELOW_MARKET_THRESHOLD: f64 = 0.10;

/// Dispersion under which a house's prices are reported as stable.
pub const STABLE_DISPERSION: f64 = 0.15;

const HOUSE_HASH_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseSummary {
    /// Raw address of the cluster's first listing.
    pub address: String,
    /// Stable identifier of the house, derived from `address`.
    pub house_hash: String,
    pub min_price: f64,
    pub max_price: f64,
    pub rooms: Option<(u32, u32)>,
    pub count: usize,
    pub score: f64,
    /// Whole percent below the market median, when above the threshold.
    pub below_market_percent: Option<u32>,
    pub stable_prices: bool,
    pub member_ids: Vec<String>,
}

/// First 16 hex characters of the MD5 digest of `address`.
#[must_use]
pub fn house_hash(address: &str) -> String {
    let mut context = md5::Context::new();
    context.consume(address.as_bytes());
    let mut hex = format!("{:x}", context.finalize());
    hex.truncate(HOUSE_HASH_LEN);
    hex
}

/// Summarises the best `limit` priced clusters, highest score first.
/// Clusters without any priced listing are skipped.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn summarize(
    clusters: &[Cluster],
    market_median: f64,
    weights: &WeightVector,
    limit: usize,
) -> Vec<HouseSummary> {
    score_clusters(clusters, market_median, weights)
        .into_iter()
        .filter_map(|result| {
            let (min_price, max_price) = result.cluster.price_range()?;
            let features = result.features;

            let below_market_percent = features
                .median_price_per_area
                .filter(|_| market_median > 0.0)
                .map(|median| (market_median - median) / market_median)
                .filter(|diff| *diff > BELOW_MARKET_THRESHOLD)
                .map(|diff| (diff * 100.0) as u32);

            let stable_prices = features
                .dispersion
                .is_some_and(|d| d < STABLE_DISPERSION)
                && priced_count(result.cluster) > 1;

            let address = result.cluster.address().to_string();
            log::debug!(
                "address={address} count={} score={:.4} market_ppa={market_median:.2}",
                features.count,
                result.score
            );

            Some(HouseSummary {
                house_hash: house_hash(&address),
                address,
                min_price,
                max_price,
                rooms: result.cluster.rooms_range(),
                count: features.count,
                score: result.score,
                below_market_percent,
                stable_prices,
                member_ids: result
                    .cluster
                    .member_ids()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
        })
        .take(limit)
        .collect()
}

fn priced_count(cluster: &Cluster) -> usize {
    cluster
        .members
        .iter()
        .filter_map(crate::stats::price_per_area)
        .count()
}

/// Formats a price as `$12 345`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_price(price: f64) -> String {
    let digits = (price.round() as i64).unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    if price < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Renders summaries as plain text, one block per house.
#[must_use]
pub fn render_summary(summaries: &[HouseSummary]) -> String {
    if summaries.is_empty() {
        return "No matching houses.\n".to_string();
    }

    let mut text = format!("Found {} houses:\n", summaries.len());
    for (position, house) in summaries.iter().enumerate() {
        text.push('\n');
        text.push_str(&render_house(position + 1, house));
    }
    text
}

fn render_house(position: usize, house: &HouseSummary) -> String {
    let rooms = match house.rooms {
        Some((lo, hi)) if lo == hi => format!(", {lo} rooms"),
        Some((lo, hi)) => format!(", {lo}-{hi} rooms"),
        None => String::new(),
    };

    let mut lines = vec![
        format!("{position}. {}", house.address),
        format!(
            "   {} – {}",
            format_price(house.min_price),
            format_price(house.max_price)
        ),
        format!("   {} listings{rooms}", house.count),
    ];
    if let Some(percent) = house.below_market_percent {
        lines.push(format!("   ~{percent}% below market"));
    }
    if house.stable_prices {
        lines.push("   stable prices".to_string());
    }
    lines.push(format!("   score {:.4} [{}]", house.score, house.house_hash));

    let mut block = lines.join("\n");
    block.push('\n');
    block
}
