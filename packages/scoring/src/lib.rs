#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Market statistics and attractiveness scoring for listing clusters.
//!
//! The runtime path is [`stats::market_median`] → [`features::features`] →
//! [`score::score`]. [`evaluate`] wraps that path for offline calibration
//! of the weight vector, and [`summary`] renders the best houses for
//! notifications.

pub mod config;
pub mod evaluate;
pub mod features;
pub mod progress;
pub mod score;
pub mod stats;
pub mod summary;

pub use config::{Objective, TuningConfig};
pub use evaluate::{evaluate, rank, rank_with_progress};
pub use features::features;
pub use progress::{NullProgress, ProgressCallback, null_progress};
pub use score::{COUNT_CAP, SubScores, score, score_cluster, score_clusters, sub_scores};
pub use stats::{DEFAULT_MARKET_MEDIAN, market_median, median, price_per_area};
pub use summary::{HouseSummary, render_summary, summarize};
