use geo::{Distance, Haversine, Point};
use realty_address::CoordinateExtractor;
use realty_listing_models::Cluster;

/// Largest great-circle distance in metres from the first geo-located
/// member of `cluster` to any other geo-located member.
///
/// Returns `None` when fewer than two members carry coordinates.
#[must_use]
pub fn spread_m(cluster: &Cluster, extractor: &CoordinateExtractor) -> Option<f64> {
    let mut points = cluster
        .members
        .iter()
        .filter_map(|listing| extractor.coordinates(listing))
        .map(|(lat, lon)| Point::new(lon, lat));

    let anchor = points.next()?;
    points
        .map(|point| Haversine.distance(anchor, point))
        .reduce(f64::max)
}

#[cfg(test)]
mod tests {
    use realty_listing_models::{GroupKey, Listing};

    use super::*;

    fn cluster(members: Vec<Listing>) -> Cluster {
        Cluster {
            key: GroupKey::RawAddress {
                locality: String::new(),
                raw: String::new(),
            },
            first_index: 0,
            members,
        }
    }

    #[test]
    fn none_without_two_located_members() {
        let extractor = CoordinateExtractor::default();
        let single = cluster(vec![
            Listing::new("1", "kufar").with_coordinates(53.13, 26.0),
            Listing::new("2", "kufar"),
        ]);
        assert_eq!(spread_m(&single, &extractor), None);
    }

    #[test]
    fn measures_distance_from_first_member() {
        let extractor = CoordinateExtractor::default();
        let c = cluster(vec![
            Listing::new("1", "kufar").with_coordinates(53.1315, 26.0071),
            Listing::new("2", "kufar").with_coordinates(53.1315, 26.0071),
            Listing::new("3", "kufar").with_coordinates(53.1405, 26.0071),
        ]);
        let spread = spread_m(&c, &extractor).unwrap();
        // 0.009 degrees of latitude is about one kilometre
        assert!((spread - 1000.0).abs() < 10.0, "spread was {spread}");
    }

    #[test]
    fn identical_points_have_zero_spread() {
        let extractor = CoordinateExtractor::default();
        let c = cluster(vec![
            Listing::new("1", "kufar").with_coordinates(53.9, 27.56),
            Listing::new("2", "realt").with_coordinates(53.9, 27.56),
        ]);
        assert!(spread_m(&c, &extractor).unwrap().abs() < f64::EPSILON);
    }
}
