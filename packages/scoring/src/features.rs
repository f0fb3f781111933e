use realty_listing_models::{Cluster, GroupFeatures};

use crate::stats::{median, price_per_area};

/// Price statistics of one cluster.
///
/// `dispersion` is `(max - min) / median` over the members' defined
/// price-per-area values: `None` with no such values, `0` with a single
/// one. `count` is always the member count.
#[must_use]
pub fn features(cluster: &Cluster) -> GroupFeatures {
    let values: Vec<f64> = cluster.members.iter().filter_map(price_per_area).collect();
    let median_price_per_area = median(&values);

    let dispersion = median_price_per_area.map(|mid| {
        if values.len() < 2 || mid == 0.0 {
            return 0.0;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (max - min) / mid
    });

    GroupFeatures {
        median_price_per_area,
        dispersion,
        count: cluster.len(),
    }
}

#[cfg(test)]
mod tests {
    use realty_listing_models::{GroupKey, Listing};

    use super::*;

    const EPSILON: f64 = 1e-9;

    fn cluster(ppa: &[Option<f64>]) -> Cluster {
        Cluster {
            key: GroupKey::Address {
                locality: "барановичи".to_string(),
                street: "николы теслы".to_string(),
                house: "33".to_string(),
            },
            first_index: 0,
            members: ppa
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    let listing = Listing::new(i.to_string(), "kufar").with_area(1.0);
                    match value {
                        Some(v) => listing.with_price(*v),
                        None => listing,
                    }
                })
                .collect(),
        }
    }

    #[test]
    fn median_and_dispersion() {
        let f = features(&cluster(&[Some(80.0), Some(100.0), Some(150.0)]));
        assert!((f.median_price_per_area.unwrap() - 100.0).abs() < EPSILON);
        assert!((f.dispersion.unwrap() - 0.7).abs() < EPSILON);
        assert_eq!(f.count, 3);
    }

    #[test]
    fn single_value_has_zero_dispersion() {
        let f = features(&cluster(&[Some(130.0)]));
        assert_eq!(f.dispersion, Some(0.0));
        assert_eq!(f.count, 1);
    }

    #[test]
    fn unpriced_members_count_but_do_not_price() {
        let f = features(&cluster(&[Some(90.0), None, Some(110.0), None]));
        assert!((f.median_price_per_area.unwrap() - 100.0).abs() < EPSILON);
        assert!((f.dispersion.unwrap() - 0.2).abs() < EPSILON);
        assert_eq!(f.count, 4);
    }

    #[test]
    fn no_prices_means_absent_features() {
        let f = features(&cluster(&[None, None]));
        assert_eq!(f.median_price_per_area, None);
        assert_eq!(f.dispersion, None);
        assert_eq!(f.count, 2);
    }
}
