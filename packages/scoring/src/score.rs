//! Weighted attractiveness score of a cluster.
//!
//! Four sub-scores are combined linearly with caller-supplied weights:
//!
//! | Sub-score  | Formula                                 | Higher means            |
//! |------------|-----------------------------------------|-------------------------|
//! | price      | `market / cluster`                      | cheaper per m²          |
//! | delta      | `(market - cluster) / market`           | further below market    |
//! | dispersion | `max(0, 1 - dispersion)`                | more consistent pricing |
//! | count      | `min(count, 6) / 6`                     | more corroborating ads  |
//!
//! The final score is not clamped. Only relative magnitudes are meaningful.

use realty_listing_models::{Cluster, GroupFeatures, ScoreResult, WeightVector};

use crate::features::features;

/// Cluster size beyond which more listings no longer raise the count
/// sub-score.
pub const COUNT_CAP: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub price: f64,
    pub delta: f64,
    pub dispersion: f64,
    pub count: f64,
}

impl SubScores {
    #[must_use]
    pub fn weighted(&self, weights: &WeightVector) -> f64 {
        weights.price * self.price
            + weights.delta * self.delta
            + weights.dispersion * self.dispersion
            + weights.count * self.count
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

/// Sub-scores of a cluster, or `None` when it has no pricing data.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sub_scores(features: &GroupFeatures, market_median: f64) -> Option<SubScores> {
    let cluster_median = features.median_price_per_area?;

    Some(SubScores {
        price: ratio(market_median, cluster_median),
        delta: ratio(market_median - cluster_median, market_median),
        dispersion: (1.0 - features.dispersion.unwrap_or(0.0)).max(0.0),
        count: features.count.min(COUNT_CAP) as f64 / COUNT_CAP as f64,
    })
}

/// Score of already-computed features. `0` without pricing data.
#[must_use]
pub fn score_features(features: &GroupFeatures, market_median: f64, weights: &WeightVector) -> f64 {
    sub_scores(features, market_median).map_or(0.0, |s| s.weighted(weights))
}

#[must_use]
pub fn score(cluster: &Cluster, market_median: f64, weights: &WeightVector) -> f64 {
    score_features(&features(cluster), market_median, weights)
}

#[must_use]
pub fn score_cluster<'a>(
    cluster: &'a Cluster,
    market_median: f64,
    weights: &WeightVector,
) -> ScoreResult<'a> {
    let features = features(cluster);
    ScoreResult {
        cluster,
        score: score_features(&features, market_median, weights),
        features,
    }
}

/// Scores every cluster, highest score first. Equal scores keep input
/// order.
#[must_use]
pub fn score_clusters<'a>(
    clusters: &'a [Cluster],
    market_median: f64,
    weights: &WeightVector,
) -> Vec<ScoreResult<'a>> {
    let mut results: Vec<ScoreResult<'a>> = clusters
        .iter()
        .map(|cluster| score_cluster(cluster, market_median, weights))
        .collect();
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results
}

#[cfg(test)]
mod tests {
    use realty_listing_models::{GroupKey, Listing};

    use super::*;

    const EPSILON: f64 = 1e-9;
    const BALANCED: WeightVector = WeightVector::new(0.45, 0.25, 0.15, 0.15);

    fn features_of(median: f64, dispersion: f64, count: usize) -> GroupFeatures {
        GroupFeatures {
            median_price_per_area: Some(median),
            dispersion: Some(dispersion),
            count,
        }
    }

    fn cluster(id: &str, ppa: &[f64]) -> Cluster {
        Cluster {
            key: GroupKey::RawAddress {
                locality: String::new(),
                raw: id.to_string(),
            },
            first_index: 0,
            members: ppa
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    Listing::new(format!("{id}-{i}"), "kufar")
                        .with_price(*v * 50.0)
                        .with_area(50.0)
                })
                .collect(),
        }
    }

    fn raw_key(cluster: &Cluster) -> &str {
        match &cluster.key {
            GroupKey::RawAddress { raw, .. } => raw,
            _ => "",
        }
    }

    #[test]
    fn sub_scores_match_formulas() {
        let s = sub_scores(&features_of(100.0, 0.2, 3), 120.0).unwrap();
        assert!((s.price - 1.2).abs() < EPSILON);
        assert!((s.delta - (20.0 / 120.0)).abs() < EPSILON);
        assert!((s.dispersion - 0.8).abs() < EPSILON);
        assert!((s.count - 0.5).abs() < EPSILON);
    }

    #[test]
    fn no_pricing_scores_zero() {
        let f = GroupFeatures {
            median_price_per_area: None,
            dispersion: None,
            count: 5,
        };
        assert_eq!(sub_scores(&f, 120.0), None);
        assert!(score_features(&f, 120.0, &BALANCED).abs() < EPSILON);
    }

    #[test]
    fn count_is_capped() {
        let six = sub_scores(&features_of(100.0, 0.0, 6), 100.0).unwrap();
        let forty = sub_scores(&features_of(100.0, 0.0, 40), 100.0).unwrap();
        assert!((six.count - 1.0).abs() < EPSILON);
        assert!((forty.count - 1.0).abs() < EPSILON);
    }

    #[test]
    fn wide_dispersion_floors_at_zero() {
        let s = sub_scores(&features_of(100.0, 1.7, 2), 100.0).unwrap();
        assert!(s.dispersion.abs() < EPSILON);
    }

    #[test]
    fn cheaper_cluster_has_higher_price_and_delta() {
        let market = 120.0;
        let mut previous = sub_scores(&features_of(150.0, 0.1, 3), market).unwrap();
        for median in [130.0, 120.0, 100.0, 80.0, 40.0] {
            let current = sub_scores(&features_of(median, 0.1, 3), market).unwrap();
            assert!(current.price > previous.price);
            assert!(current.delta > previous.delta);
            assert!((current.dispersion - previous.dispersion).abs() < EPSILON);
            assert!((current.count - previous.count).abs() < EPSILON);
            previous = current;
        }
    }

    #[test]
    fn tight_pricing_beats_wide_pricing() {
        let tight = features(&cluster("tight", &[100.0, 100.0, 100.0]));
        let wide = features(&cluster("wide", &[80.0, 100.0, 150.0]));
        let tight_scores = sub_scores(&tight, 110.0).unwrap();
        let wide_scores = sub_scores(&wide, 110.0).unwrap();
        assert!(tight_scores.dispersion > wide_scores.dispersion);
        assert!(score_features(&tight, 110.0, &BALANCED) > score_features(&wide, 110.0, &BALANCED));
    }

    #[test]
    fn score_is_linear_combination() {
        let c = cluster("a", &[90.0, 95.0, 100.0]);
        let s = sub_scores(&features(&c), 120.0).unwrap();
        let expected = 0.45 * s.price + 0.25 * s.delta + 0.15 * s.dispersion + 0.15 * s.count;
        assert!((score(&c, 120.0, &BALANCED) - expected).abs() < EPSILON);
    }

    #[test]
    fn zero_weights_score_zero() {
        let c = cluster("a", &[90.0, 95.0, 100.0]);
        let zero = WeightVector::new(0.0, 0.0, 0.0, 0.0);
        assert!(score(&c, 120.0, &zero).abs() < EPSILON);
    }

    #[test]
    fn zero_market_median_does_not_divide_by_zero() {
        let s = sub_scores(&features_of(100.0, 0.0, 1), 0.0).unwrap();
        assert!(s.price.abs() < EPSILON);
        assert!(s.delta.abs() < EPSILON);
    }

    #[test]
    fn score_clusters_sorts_descending_and_stably() {
        let clusters = vec![
            cluster("expensive", &[130.0]),
            cluster("cheap", &[90.0, 95.0, 100.0]),
            cluster("twin-a", &[110.0]),
            cluster("twin-b", &[110.0]),
        ];
        let ranked = score_clusters(&clusters, 120.0, &BALANCED);
        let order: Vec<&str> = ranked.iter().map(|r| raw_key(r.cluster)).collect();
        assert_eq!(order, vec!["cheap", "twin-a", "twin-b", "expensive"]);
    }
}
