#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Building-level grouping of marketplace listings.
//!
//! Each listing receives a [`GroupKey`](realty_listing_models::GroupKey)
//! from [`key::GroupKeyBuilder`], and [`cluster::Grouper`] partitions a
//! batch into clusters of listings sharing a key. Optional signature
//! de-duplication ([`dedupe`]) removes re-posts beforehand, and
//! [`spread::spread_m`] measures how far apart a cluster's geo-located
//! members are.

pub mod cluster;
pub mod config;
pub mod dedupe;
pub mod key;
pub mod spread;

pub use cluster::{Grouper, group};
pub use config::{ConfigError, GroupingConfig};
pub use dedupe::{dedupe_by_signature, listing_signature};
pub use key::{GroupKeyBuilder, coordinate_bucket};
pub use spread::spread_m;
