#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address, locality and coordinate extraction for marketplace listings.
//!
//! Marketplaces publish addresses in many shapes:
//! - With a locality prefix: `"г. Барановичи, улица Николы Теслы, 33а"`
//! - Abbreviated street types: `"Барановичи, ул. Николы Теслы, 33"`
//! - Building numbers: `"пр-т Независимости 12 корпус 3"`, `"12/3"`
//! - Apartment noise: `"ул. Ленина, 5, кв. 12"`
//!
//! [`normalize::AddressNormalizer`] reduces these to a canonical
//! (street, house) pair, [`locality::LocalityExtractor`] finds the city,
//! and [`coordinates::CoordinateExtractor`] pulls plausible GPS data out
//! of the listing.

pub mod config;
pub mod coordinates;
pub mod locality;
pub mod normalize;
pub mod synonyms;

pub use config::{AddressConfig, CoordinateConfig, LocalityConfig};
pub use coordinates::CoordinateExtractor;
pub use locality::{LocalityExtractor, LocalityStrategy};
pub use normalize::{AddressNormalizer, normalize};
