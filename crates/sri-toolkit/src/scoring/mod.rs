//! Smart Readiness Indicator engine.
//!
//! [`ScoreEvaluator`] turns a [`BuildingConfiguration`] into achieved and maximum
//! domain/criterion scores, the [`aggregate`] functions fold those into the
//! hierarchical report, [`SriCalculator`] chains both, and [`UpgradeExplorer`]
//! searches for level upgrades that reach a target total.

pub mod aggregate;
mod calculator;
mod criteria;
mod error;
mod evaluator;
mod selection;
mod upgrade;

pub use aggregate::{round2, SriReport};
pub use calculator::SriCalculator;
pub use criteria::{
    CriterionScores, DomainCriterionKey, ImpactCriterion, ImpactWeights, KeyFunctionality,
};
pub use error::{LookupError, ScoringError, ValidationError};
pub use evaluator::{DomainCriterionScores, DomainScores, ScoreEvaluator};
pub use selection::{BuildingConfiguration, LevelMix, LevelSelection};
pub use upgrade::{UpgradeExplorer, UpgradeOutcome, UpgradePlan, UpgradeStep, DEFAULT_MAX_DEPTH};

#[cfg(test)]
pub(crate) mod fixtures;
