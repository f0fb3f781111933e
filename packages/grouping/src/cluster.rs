//! Single-pass clustering by [`GroupKey`].
//!
//! No pairwise proximity merge is attempted: two nearby listings whose
//! addresses do not parse to the same key and whose coordinates fall into
//! different buckets stay in separate clusters. This keeps a run O(n).

use std::collections::BTreeMap;

use realty_listing_models::{Cluster, GroupKey, Listing};

use crate::config::GroupingConfig;
use crate::key::GroupKeyBuilder;
use crate::spread::spread_m;

/// Groups listings into building-level clusters using the default
/// configuration.
#[must_use]
pub fn group(listings: &[Listing]) -> Vec<Cluster> {
    Grouper::default().group(listings)
}

/// Clustering engine bound to one [`GroupingConfig`].
#[derive(Debug, Clone)]
pub struct Grouper {
    keys: GroupKeyBuilder,
    spread_warning_m: f64,
}

impl Default for Grouper {
    fn default() -> Self {
        Self::new(&GroupingConfig::default())
    }
}

impl Grouper {
    #[must_use]
    pub fn new(config: &GroupingConfig) -> Self {
        Self {
            keys: GroupKeyBuilder::new(config),
            spread_warning_m: config.spread_warning_m,
        }
    }

    #[must_use]
    pub const fn keys(&self) -> &GroupKeyBuilder {
        &self.keys
    }

    /// Partitions `listings` into clusters.
    ///
    /// Every listing lands in exactly one cluster. Clusters are returned in
    /// order of first appearance of their key and members keep their input
    /// order, so the same input always yields the same output.
    #[must_use]
    pub fn group(&self, listings: &[Listing]) -> Vec<Cluster> {
        let mut index_by_key: BTreeMap<GroupKey, usize> = BTreeMap::new();
        let mut clusters: Vec<Cluster> = Vec::new();

        for (position, listing) in listings.iter().enumerate() {
            let key = self.keys.key(listing);
            log::debug!(
                "{}/{} -> {} ({})",
                listing.source,
                listing.external_id,
                key,
                key.kind()
            );

            if let Some(&index) = index_by_key.get(&key) {
                clusters[index].members.push(listing.clone());
            } else {
                index_by_key.insert(key.clone(), clusters.len());
                clusters.push(Cluster {
                    key,
                    first_index: position,
                    members: vec![listing.clone()],
                });
            }
        }

        log::info!(
            "Grouped {} listings into {} clusters",
            listings.len(),
            clusters.len()
        );

        for cluster in &clusters {
            if let Some(spread) = spread_m(cluster, self.keys.coordinate_extractor())
                && spread > self.spread_warning_m
            {
                log::warn!(
                    "Cluster {} spans {spread:.0} m across {} listings; possible mis-grouping",
                    cluster.key,
                    cluster.len()
                );
            }
        }

        clusters
    }
}
