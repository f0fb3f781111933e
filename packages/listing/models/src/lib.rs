#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Listing, cluster and scoring result types.
//!
//! Scraped marketplace ads arrive as [`Listing`] records. The grouping
//! engine partitions them into [`Cluster`]s keyed by a [`GroupKey`], and
//! the scoring engine turns each cluster into [`GroupFeatures`] and a
//! [`ScoreResult`] under a caller-supplied [`WeightVector`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// One scraped classified ad.
///
/// Owned by the caller. The engine treats it as an immutable value for the
/// duration of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Identifier, unique within its source.
    pub external_id: String,
    /// Marketplace the ad was scraped from (e.g. "kufar", "realt").
    pub source: String,
    /// Ad title.
    #[serde(default)]
    pub title: String,
    /// Price, already converted to the comparison currency.
    pub price: Option<f64>,
    /// Number of rooms.
    pub rooms: Option<u32>,
    /// Total floor area in square metres.
    pub area: Option<f64>,
    /// Free-text address as published by the marketplace.
    #[serde(default)]
    pub address: String,
    /// Latitude (WGS84), when the marketplace exposes it directly.
    pub latitude: Option<f64>,
    /// Longitude (WGS84), when the marketplace exposes it directly.
    pub longitude: Option<f64>,
    /// Floor as published (e.g. "3/9").
    pub floor: Option<String>,
    /// Photo URLs in marketplace order.
    #[serde(default)]
    pub photos: Vec<String>,
    /// Opaque source payload (city, coordinates, agency, ...).
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// When the ad was created on the marketplace.
    pub created_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Creates a listing with only its identity set.
    #[must_use]
    pub fn new(external_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            source: source.into(),
            title: String::new(),
            price: None,
            rooms: None,
            area: None,
            address: String::new(),
            latitude: None,
            longitude: None,
            floor: None,
            photos: Vec::new(),
            metadata: BTreeMap::new(),
            created_at: None,
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    #[must_use]
    pub const fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub const fn with_area(mut self, area: f64) -> Self {
        self.area = Some(area);
        self
    }

    #[must_use]
    pub const fn with_rooms(mut self, rooms: u32) -> Self {
        self.rooms = Some(rooms);
        self
    }

    #[must_use]
    pub const fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns a trimmed, non-empty string value from the metadata payload.
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Returns a numeric metadata value. Numeric strings (including a comma
    /// decimal separator) are accepted.
    #[must_use]
    pub fn metadata_f64(&self, key: &str) -> Option<f64> {
        match self.metadata.get(key)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().replace(',', ".").parse().ok(),
            _ => None,
        }
    }

    /// Agency or private seller name, if the source payload carries one.
    #[must_use]
    pub fn vendor(&self) -> Option<&str> {
        self.metadata_str("agency")
            .or_else(|| self.metadata_str("seller"))
    }
}

/// Canonical (street, house) pair derived from a raw address.
///
/// Empty strings mean the component could not be parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAddress {
    /// Case-folded street name without its street-type word.
    pub street: String,
    /// Canonical house token, e.g. `"33"`, `"33а"`, `"33/1"`.
    pub house: String,
}

impl ParsedAddress {
    /// Whether both street and house were recognised.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        !self.street.is_empty() && !self.house.is_empty()
    }
}

/// Which fallback level produced a [`GroupKey`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupKeyKind {
    /// Parsed street and house number.
    Address,
    /// Rounded coordinate bucket.
    Coordinates,
    /// Byte-identical raw address text.
    RawAddress,
}

/// The value two listings must share to land in the same [`Cluster`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GroupKey {
    /// Locality plus normalized street and house.
    #[serde(rename_all = "camelCase")]
    Address {
        locality: String,
        street: String,
        house: String,
    },
    /// Locality plus coordinates rounded to `precision` decimal places,
    /// stored as scaled integers.
    #[serde(rename_all = "camelCase")]
    Coordinates {
        locality: String,
        lat_bucket: i64,
        lon_bucket: i64,
        precision: u32,
    },
    /// Locality plus the untouched raw address string.
    #[serde(rename_all = "camelCase")]
    RawAddress { locality: String, raw: String },
}

impl GroupKey {
    #[must_use]
    pub const fn kind(&self) -> GroupKeyKind {
        match self {
            Self::Address { .. } => GroupKeyKind::Address,
            Self::Coordinates { .. } => GroupKeyKind::Coordinates,
            Self::RawAddress { .. } => GroupKeyKind::RawAddress,
        }
    }

    #[must_use]
    pub fn locality(&self) -> &str {
        match self {
            Self::Address { locality, .. }
            | Self::Coordinates { locality, .. }
            | Self::RawAddress { locality, .. } => locality,
        }
    }
}

impl fmt::Display for GroupKey {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address {
                locality,
                street,
                house,
            } => write!(f, "{locality}|{street}|{house}"),
            Self::Coordinates {
                locality,
                lat_bucket,
                lon_bucket,
                precision,
            } => {
                let scale = 10_f64.powi(*precision as i32);
                let decimals = *precision as usize;
                write!(
                    f,
                    "{locality}|@{:.decimals$},{:.decimals$}",
                    *lat_bucket as f64 / scale,
                    *lon_bucket as f64 / scale,
                )
            }
            Self::RawAddress { locality, raw } => write!(f, "{locality}|raw:{raw}"),
        }
    }
}

/// Listings believed to describe one physical building.
///
/// Always has at least one member. Members keep their input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Key shared by every member.
    pub key: GroupKey,
    /// Input position of the first member, used as a stable tie-break.
    pub first_index: usize,
    /// Members in input order.
    pub members: Vec<Listing>,
}

impl Cluster {
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Representative address: the raw address of the first member.
    #[must_use]
    pub fn address(&self) -> &str {
        self.members.first().map_or("", |l| l.address.as_str())
    }

    #[must_use]
    pub fn member_ids(&self) -> Vec<&str> {
        self.members.iter().map(|l| l.external_id.as_str()).collect()
    }

    /// Lowest and highest positive price among members.
    #[must_use]
    pub fn price_range(&self) -> Option<(f64, f64)> {
        self.members
            .iter()
            .filter_map(|l| l.price)
            .filter(|p| p.is_finite() && *p > 0.0)
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
            })
    }

    /// Smallest and largest room count among members.
    #[must_use]
    pub fn rooms_range(&self) -> Option<(u32, u32)> {
        let rooms = self.members.iter().filter_map(|l| l.rooms).filter(|r| *r > 0);
        let min = rooms.clone().min()?;
        let max = rooms.max()?;
        Some((min, max))
    }

    #[must_use]
    pub fn earliest_created_at(&self) -> Option<DateTime<Utc>> {
        self.members.iter().filter_map(|l| l.created_at).min()
    }
}

/// Price statistics of one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFeatures {
    /// Median price-per-area of members that have both price and area.
    pub median_price_per_area: Option<f64>,
    /// `(max - min) / median` over the same values.
    pub dispersion: Option<f64>,
    /// Cluster size, regardless of price availability.
    pub count: usize,
}

/// Coefficients of the four sub-scores. Not required to sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightVector {
    pub price: f64,
    pub delta: f64,
    pub dispersion: f64,
    pub count: f64,
}

impl WeightVector {
    #[must_use]
    pub const fn new(price: f64, delta: f64, dispersion: f64, count: f64) -> Self {
        Self {
            price,
            delta,
            dispersion,
            count,
        }
    }
}

impl fmt::Display for WeightVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.price, self.delta, self.dispersion, self.count
        )
    }
}

/// Error returned when parsing a [`WeightVector`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWeightsError {
    /// Not exactly four comma-separated elements.
    #[error("expected 4 comma-separated weights (price,delta,dispersion,count), got {0}")]
    WrongLength(usize),

    /// An element is not a finite number.
    #[error("invalid weight {0:?}")]
    InvalidNumber(String),
}

impl FromStr for WeightVector {
    type Err = ParseWeightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(ParseWeightsError::WrongLength(parts.len()));
        }

        let mut values = [0.0_f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ParseWeightsError::InvalidNumber((*part).to_string()))?;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }
}

/// A named weight vector evaluated by the tuning harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightCandidate {
    pub name: String,
    pub weights: WeightVector,
}

/// Score of one cluster under one weight vector and market median.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult<'a> {
    pub cluster: &'a Cluster,
    pub score: f64,
    pub features: GroupFeatures,
}

/// A cluster's place in an evaluation's top-K slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCluster {
    /// Position of the cluster in the evaluated cluster list.
    pub cluster_index: usize,
    pub score: f64,
    pub features: GroupFeatures,
}

/// Aggregate quality of the top-K clusters under one weight vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub weights: WeightVector,
    /// Best clusters, highest score first.
    pub top: Vec<RankedCluster>,
    /// Mean of the defined median price-per-area values in `top`.
    pub mean_price_per_area: Option<f64>,
    /// Mean of the defined dispersion values in `top`.
    pub mean_dispersion: Option<f64>,
    /// Mean member count in `top` (0 when `top` is empty).
    pub mean_count: f64,
}

/// One candidate's position in a tuning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRanking {
    pub candidate: WeightCandidate,
    pub evaluation: EvaluationResult,
    /// Min-max normalised mean price-per-area across candidates.
    pub normalized_price_per_area: f64,
    /// Min-max normalised mean dispersion across candidates.
    pub normalized_dispersion: f64,
    /// `|mean_count - target| / target`.
    pub count_deviation: f64,
    /// Composite objective; lower is better.
    pub objective: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(members: Vec<Listing>) -> Cluster {
        Cluster {
            key: GroupKey::RawAddress {
                locality: String::new(),
                raw: "x".to_string(),
            },
            first_index: 0,
            members,
        }
    }

    #[test]
    fn parses_weight_vector() {
        let w: WeightVector = "0.45, 0.25,0.15,0.15".parse().unwrap();
        assert_eq!(w, WeightVector::new(0.45, 0.25, 0.15, 0.15));
        assert_eq!(w.to_string(), "0.45,0.25,0.15,0.15");
    }

    #[test]
    fn rejects_wrong_weight_count() {
        assert_eq!(
            "0.5,0.5".parse::<WeightVector>(),
            Err(ParseWeightsError::WrongLength(2))
        );
    }

    #[test]
    fn rejects_non_numeric_weight() {
        assert_eq!(
            "0.5,abc,0.1,0.1".parse::<WeightVector>(),
            Err(ParseWeightsError::InvalidNumber("abc".to_string()))
        );
        assert!("0.5,NaN,0.1,0.1".parse::<WeightVector>().is_err());
    }

    #[test]
    fn displays_coordinate_key_with_precision() {
        let key = GroupKey::Coordinates {
            locality: "барановичи".to_string(),
            lat_bucket: 53_132,
            lon_bucket: 26_007,
            precision: 3,
        };
        assert_eq!(key.to_string(), "барановичи|@53.132,26.007");
        assert_eq!(key.kind(), GroupKeyKind::Coordinates);
        assert_eq!(key.kind().as_ref(), "COORDINATES");
    }

    #[test]
    fn reads_metadata_numbers_and_strings() {
        let listing = Listing::new("1", "kufar")
            .with_metadata("lat", serde_json::json!(53.1))
            .with_metadata("lng", serde_json::json!("26,05"))
            .with_metadata("city", serde_json::json!("  "));
        assert_eq!(listing.metadata_f64("lat"), Some(53.1));
        assert_eq!(listing.metadata_f64("lng"), Some(26.05));
        assert_eq!(listing.metadata_str("city"), None);
    }

    #[test]
    fn vendor_prefers_agency() {
        let listing = Listing::new("1", "realt")
            .with_metadata("seller", serde_json::json!("Иван"))
            .with_metadata("agency", serde_json::json!("Твоя Столица"));
        assert_eq!(listing.vendor(), Some("Твоя Столица"));
    }

    #[test]
    fn cluster_diagnostics() {
        let c = cluster(vec![
            Listing::new("a", "kufar")
                .with_address("ул. Ленина, 5")
                .with_price(50_000.0)
                .with_rooms(2),
            Listing::new("b", "realt").with_price(42_000.0).with_rooms(1),
            Listing::new("c", "onliner"),
        ]);
        assert_eq!(c.len(), 3);
        assert_eq!(c.address(), "ул. Ленина, 5");
        assert_eq!(c.member_ids(), vec!["a", "b", "c"]);
        assert_eq!(c.price_range(), Some((42_000.0, 50_000.0)));
        assert_eq!(c.rooms_range(), Some((1, 2)));
        assert_eq!(c.earliest_created_at(), None);
    }

    #[test]
    fn deserializes_camel_case_listing() {
        let json = r#"{
            "externalId": "k-1",
            "source": "kufar",
            "price": 61000,
            "area": 54.2,
            "address": "Барановичи, ул. Николы Теслы, 33",
            "createdAt": "2025-03-01T10:00:00Z"
        }"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.external_id, "k-1");
        assert_eq!(listing.price, Some(61_000.0));
        assert!(listing.photos.is_empty());
        assert!(listing.created_at.is_some());
    }
}
