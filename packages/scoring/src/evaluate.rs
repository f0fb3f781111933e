//! Offline weight evaluation harness.
//!
//! [`evaluate`] scores every cluster under one weight vector and summarises
//! the best `top_k`. [`rank`] runs it for each candidate vector over the
//! same clustered input and orders the candidates by a composite objective
//! (lower is better). None of this is on the scoring path used for
//! alerting; it exists to calibrate weights against historical batches.

use std::sync::Arc;

use realty_grouping::Grouper;
use realty_listing_models::{
    CandidateRanking, Cluster, EvaluationResult, GroupFeatures, Listing, RankedCluster,
    WeightCandidate, WeightVector,
};

use crate::config::Objective;
use crate::features::features;
use crate::progress::{ProgressCallback, null_progress};
use crate::score::score_features;
use crate::stats::market_median;

/// Scores `clusters` under `weights` and reports means over the best
/// `top_k`. Ties keep cluster input order.
#[must_use]
pub fn evaluate(
    weights: &WeightVector,
    clusters: &[Cluster],
    market_median: f64,
    top_k: usize,
) -> EvaluationResult {
    let features: Vec<GroupFeatures> = clusters.iter().map(features).collect();
    evaluate_features(weights, &features, market_median, top_k)
}

/// [`evaluate`] over precomputed per-cluster features, indexed like the
/// clusters they came from.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn evaluate_features(
    weights: &WeightVector,
    features: &[GroupFeatures],
    market_median: f64,
    top_k: usize,
) -> EvaluationResult {
    let mut scored: Vec<RankedCluster> = features
        .iter()
        .enumerate()
        .map(|(cluster_index, f)| RankedCluster {
            cluster_index,
            score: score_features(f, market_median, weights),
            features: *f,
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_k);

    let mean_price_per_area = mean(scored.iter().filter_map(|r| r.features.median_price_per_area));
    let mean_dispersion = mean(scored.iter().filter_map(|r| r.features.dispersion));
    let mean_count = mean(scored.iter().map(|r| r.features.count as f64)).unwrap_or(0.0);

    EvaluationResult {
        weights: *weights,
        top: scored,
        mean_price_per_area,
        mean_dispersion,
        mean_count,
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0_usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Min-max normalises `values` into `[0, 1]`. Missing values map to `1`
/// (worst); all-equal values map to `0`.
fn normalize(values: &[Option<f64>]) -> Vec<f64> {
    let defined = values.iter().flatten().copied();
    let min = defined.clone().fold(f64::INFINITY, f64::min);
    let max = defined.fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    values
        .iter()
        .map(|value| match value {
            None => 1.0,
            Some(v) if range > 0.0 => (v - min) / range,
            Some(_) => 0.0,
        })
        .collect()
}

/// Ranks candidate weight vectors against one batch of listings, best
/// (lowest objective) first.
#[must_use]
pub fn rank(
    candidates: &[WeightCandidate],
    listings: &[Listing],
    grouper: &Grouper,
    objective: &Objective,
) -> Vec<CandidateRanking> {
    rank_with_progress(candidates, listings, grouper, objective, &null_progress())
}

/// [`rank`], reporting one unit of progress per candidate.
#[must_use]
pub fn rank_with_progress(
    candidates: &[WeightCandidate],
    listings: &[Listing],
    grouper: &Grouper,
    objective: &Objective,
    progress: &Arc<dyn ProgressCallback>,
) -> Vec<CandidateRanking> {
    let clusters = grouper.group(listings);
    let market = market_median(listings);
    let features: Vec<GroupFeatures> = clusters.iter().map(features).collect();

    log::info!(
        "Evaluating {} candidates over {} clusters (market median {market:.2})",
        candidates.len(),
        clusters.len()
    );
    progress.set_total(candidates.len() as u64);

    let evaluations: Vec<EvaluationResult> = candidates
        .iter()
        .map(|candidate| {
            progress.set_message(candidate.name.clone());
            let evaluation =
                evaluate_features(&candidate.weights, &features, market, objective.top_k);
            log::debug!(
                "{} ({}): mean ppa {:?}, mean dispersion {:?}, mean count {:.2}",
                candidate.name,
                candidate.weights,
                evaluation.mean_price_per_area,
                evaluation.mean_dispersion,
                evaluation.mean_count
            );
            progress.inc(1);
            evaluation
        })
        .collect();

    let ppa = normalize(
        &evaluations
            .iter()
            .map(|e| e.mean_price_per_area)
            .collect::<Vec<_>>(),
    );
    let dispersion = normalize(
        &evaluations
            .iter()
            .map(|e| e.mean_dispersion)
            .collect::<Vec<_>>(),
    );

    let mut rankings: Vec<CandidateRanking> = candidates
        .iter()
        .zip(evaluations)
        .zip(ppa.into_iter().zip(dispersion))
        .map(|((candidate, evaluation), (ppa, dispersion))| {
            let count_deviation = if objective.target_count > 0.0 {
                (evaluation.mean_count - objective.target_count).abs() / objective.target_count
            } else {
                0.0
            };
            CandidateRanking {
                candidate: candidate.clone(),
                objective: objective.alpha * ppa
                    + objective.beta * dispersion
                    + objective.gamma * count_deviation,
                evaluation,
                normalized_price_per_area: ppa,
                normalized_dispersion: dispersion,
                count_deviation,
            }
        })
        .collect();
    rankings.sort_by(|a, b| a.objective.total_cmp(&b.objective));

    if let Some(best) = rankings.first() {
        log::info!(
            "Best candidate: {} ({}) objective {:.4}",
            best.candidate.name,
            best.candidate.weights,
            best.objective
        );
    }
    progress.finish(format!("Evaluated {} candidates", candidates.len()));

    rankings
}
