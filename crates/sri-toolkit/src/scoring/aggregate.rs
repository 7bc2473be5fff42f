//! Weighted aggregation from domain/criterion scores up to the total SRI.
//!
//! Two distinct weight tables feed two distinct steps: the per-(building type,
//! zone, domain) weights from the reference data drive the impact-criterion
//! percentages, while the fixed [`ImpactWeights`] drive the domain and
//! key-functionality figures.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::criteria::{
    CriterionScores, DomainCriterionKey, ImpactCriterion, ImpactWeights, KeyFunctionality,
};
use super::error::{LookupError, ScoringError};
use super::evaluator::{DomainCriterionScores, DomainScores};
use crate::reference::ReferenceData;

/// Hierarchical result of one scoring run. All figures are rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SriReport {
    pub smart_readiness_scores: BTreeMap<DomainCriterionKey, f64>,
    pub sr_impact_criteria: BTreeMap<ImpactCriterion, f64>,
    pub sr_domains: BTreeMap<String, f64>,
    pub srf_scores: BTreeMap<KeyFunctionality, f64>,
    pub total_sri: f64,
}

/// Rounds the exact decimal value of `value` to two places, ties to even.
pub fn round2(value: f64) -> f64 {
    match Decimal::from_f64_retain(value) {
        Some(exact) => exact
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
            .to_string()
            .parse()
            .unwrap_or(value),
        None => value,
    }
}

/// `100 * achieved / maximum`, or 0 when nothing is attainable.
fn ratio_percentage(achieved: f64, maximum: f64) -> f64 {
    if maximum == 0.0 {
        0.0
    } else {
        round2(100.0 * achieved / maximum)
    }
}

pub fn domain_criterion_percentages(scores: &DomainScores) -> BTreeMap<DomainCriterionKey, f64> {
    scores
        .achieved
        .entries()
        .map(|(key, achieved)| {
            let maximum = scores.maximum.value(&key);
            (key, ratio_percentage(achieved, maximum))
        })
        .collect()
}

/// Sums `score * domain_weight[criterion]` across domains, per criterion.
///
/// Every domain present in `scores` must have a weight row for the given
/// building type and zone.
pub fn weighted_impact_criterion_sums<D>(
    reference: &D,
    building_type: &str,
    zone: &str,
    scores: &DomainCriterionScores,
) -> Result<CriterionScores, ScoringError>
where
    D: ReferenceData + ?Sized,
{
    let mut sums = CriterionScores::zero();

    for (domain, domain_scores) in scores.domains() {
        let weights = reference
            .domain_weight(building_type, zone, domain)?
            .ok_or_else(|| LookupError {
                building_type: building_type.to_string(),
                zone: zone.to_string(),
                domain: domain.to_string(),
            })?;

        for criterion in ImpactCriterion::ordered() {
            sums[criterion] += weights.weights.get(criterion) * domain_scores.get(criterion);
        }
    }

    Ok(sums)
}

pub fn impact_criterion_percentages(
    weighted_sums: &CriterionScores,
    weighted_max_sums: &CriterionScores,
) -> BTreeMap<ImpactCriterion, f64> {
    ImpactCriterion::ordered()
        .into_iter()
        .map(|criterion| {
            (
                criterion,
                ratio_percentage(
                    weighted_sums.get(criterion),
                    weighted_max_sums.get(criterion),
                ),
            )
        })
        .collect()
}

pub fn domain_percentages(
    scores: &DomainScores,
    impact_weights: &ImpactWeights,
) -> BTreeMap<String, f64> {
    let weighted = |domain_scores: &CriterionScores| -> f64 {
        domain_scores
            .iter()
            .map(|(criterion, value)| impact_weights.weight(criterion) * value)
            .sum()
    };

    scores
        .achieved
        .domains()
        .map(|(domain, achieved)| {
            let maximum = scores
                .maximum
                .domain(domain)
                .map(|maximum| weighted(maximum))
                .unwrap_or_default();
            (domain.to_string(), ratio_percentage(weighted(achieved), maximum))
        })
        .collect()
}

/// Weighted sum of the criterion percentages in each group.
///
/// Weights are not renormalised per group, so the result is only a 0-100
/// percentage when a group's weights sum to one.
pub fn key_functionality_scores(
    sr_impact_criteria: &BTreeMap<ImpactCriterion, f64>,
    impact_weights: &ImpactWeights,
) -> BTreeMap<KeyFunctionality, f64> {
    KeyFunctionality::ordered()
        .into_iter()
        .map(|functionality| {
            let score: f64 = functionality
                .criteria()
                .iter()
                .filter_map(|criterion| {
                    sr_impact_criteria
                        .get(criterion)
                        .map(|percentage| impact_weights.weight(*criterion) * percentage)
                })
                .sum();
            (functionality, round2(score))
        })
        .collect()
}

/// Equal-weighted mean of the three key functionalities.
pub fn total_score(srf_scores: &BTreeMap<KeyFunctionality, f64>) -> f64 {
    let weight = 1.0 / KeyFunctionality::ordered().len() as f64;
    let total: f64 = srf_scores.values().map(|score| score * weight).sum();
    round2(total)
}

/// Runs every aggregation step over evaluated scores.
pub fn aggregate<D>(
    reference: &D,
    building_type: &str,
    zone: &str,
    scores: &DomainScores,
    impact_weights: &ImpactWeights,
) -> Result<SriReport, ScoringError>
where
    D: ReferenceData + ?Sized,
{
    let smart_readiness_scores = domain_criterion_percentages(scores);

    let weighted_sums =
        weighted_impact_criterion_sums(reference, building_type, zone, &scores.achieved)?;
    let weighted_max_sums =
        weighted_impact_criterion_sums(reference, building_type, zone, &scores.maximum)?;
    let sr_impact_criteria = impact_criterion_percentages(&weighted_sums, &weighted_max_sums);

    let srf_scores = key_functionality_scores(&sr_impact_criteria, impact_weights);
    let total_sri = total_score(&srf_scores);
    let sr_domains = domain_percentages(scores, impact_weights);

    Ok(SriReport {
        smart_readiness_scores,
        sr_impact_criteria,
        sr_domains,
        srf_scores,
        total_sri,
    })
}
