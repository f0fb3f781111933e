#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `realty` command-line tool.
//!
//! Reads a JSON batch of scraped listings and groups, scores or tunes the
//! scoring weights over it. Uses `indicatif-log-bridge` (via
//! [`realty_cli_utils::init_logger`]) so log output and the tuning progress
//! bar do not interleave.

mod input;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use realty_grouping::{GroupingConfig, Grouper, dedupe_by_signature, spread_m};
use realty_listing_models::{Listing, WeightVector};
use realty_scoring::{TuningConfig, market_median, rank_with_progress, render_summary, summarize};

use crate::input::read_listings;

/// Weights used by `score` when `--weights` is not given.
const DEFAULT_WEIGHTS: WeightVector = WeightVector::new(0.5, 0.3, 0.1, 0.1);

#[derive(Parser)]
#[command(name = "realty", about = "Listing grouping and market scoring tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BatchArgs {
    /// JSON array of listings
    #[arg(long)]
    input: PathBuf,
    /// Grouping configuration TOML (defaults are embedded)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Drop re-posted listings before grouping
    #[arg(long)]
    dedupe: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the building-level clusters of a listing batch
    Group {
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Print the best-scoring houses of a listing batch
    Score {
        #[command(flatten)]
        batch: BatchArgs,
        /// Comma-separated weights: price,delta,dispersion,count
        #[arg(long)]
        weights: Option<WeightVector>,
        /// Maximum number of houses to print
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Rank candidate weight vectors against a listing batch
    Tune {
        #[command(flatten)]
        batch: BatchArgs,
        /// Tuning configuration TOML (defaults are embedded)
        #[arg(long)]
        tuning: Option<PathBuf>,
    },
}

struct Batch {
    grouper: Grouper,
    listings: Vec<Listing>,
}

fn load_batch(args: &BatchArgs) -> Result<Batch, Box<dyn std::error::Error>> {
    let config = GroupingConfig::load_or_embedded(args.config.as_deref())?;
    let grouper = Grouper::new(&config);
    let mut listings = read_listings(&args.input)?;

    if args.dedupe {
        listings = dedupe_by_signature(&listings, grouper.keys().normalizer());
    }

    Ok(Batch { grouper, listings })
}

fn run_group(args: &BatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let batch = load_batch(args)?;
    let clusters = batch.grouper.group(&batch.listings);

    println!("{:<12} {:>5}  {:>8}  KEY / MEMBERS", "KIND", "COUNT", "SPREAD");
    println!("{}", "-".repeat(72));
    for cluster in &clusters {
        let spread = spread_m(cluster, batch.grouper.keys().coordinate_extractor())
            .map_or_else(|| "-".to_string(), |m| format!("{m:.0} m"));
        println!(
            "{:<12} {:>5}  {:>8}  {}",
            cluster.key.kind().as_ref(),
            cluster.len(),
            spread,
            cluster.key
        );
        println!("{:<30}{}", "", cluster.member_ids().join(", "));
    }

    Ok(())
}

fn run_score(
    args: &BatchArgs,
    weights: WeightVector,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let batch = load_batch(args)?;
    let clusters = batch.grouper.group(&batch.listings);
    let market = market_median(&batch.listings);
    log::info!("Market median price per m²: {market:.2}, weights {weights}");

    let summaries = summarize(&clusters, market, &weights, limit);
    print!("{}", render_summary(&summaries));

    Ok(())
}

fn run_tune(
    multi: &realty_cli_utils::MultiProgress,
    args: &BatchArgs,
    tuning: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tuning = TuningConfig::load_or_embedded(tuning)?;
    let batch = load_batch(args)?;

    let progress = realty_cli_utils::IndicatifProgress::steps_bar(
        multi,
        "Evaluating candidates",
        tuning.candidates.len() as u64,
    );
    let rankings = rank_with_progress(
        &tuning.candidates,
        &batch.listings,
        &batch.grouper,
        &tuning.objective,
        &progress,
    );

    println!(
        "{:<4} {:<16} {:<24} {:>9} {:>9} {:>9} {:>9}",
        "#", "CANDIDATE", "WEIGHTS", "PPA", "DISP", "COUNT", "OBJECTIVE"
    );
    println!("{}", "-".repeat(86));
    for (position, ranking) in rankings.iter().enumerate() {
        println!(
            "{:<4} {:<16} {:<24} {:>9.3} {:>9.3} {:>9.3} {:>9.4}",
            position + 1,
            ranking.candidate.name,
            ranking.candidate.weights.to_string(),
            ranking.normalized_price_per_area,
            ranking.normalized_dispersion,
            ranking.count_deviation,
            ranking.objective
        );
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = realty_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Group { batch } => run_group(&batch)?,
        Commands::Score {
            batch,
            weights,
            limit,
        } => run_score(&batch, weights.unwrap_or(DEFAULT_WEIGHTS), limit)?,
        Commands::Tune { batch, tuning } => run_tune(&multi, &batch, tuning.as_deref())?,
    }

    Ok(())
}
