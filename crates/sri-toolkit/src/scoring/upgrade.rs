//! Inverse search: raise service levels one step at a time until the total SRI
//! reaches a target.
//!
//! The walk is greedy and follows a single branch. Each round upgrades the
//! first service (in code order) that has a next level defined, so it finds
//! *an* upgrade path rather than the cheapest one. A depth bound and a set of
//! visited selections guarantee termination.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::aggregate::round2;
use super::calculator::SriCalculator;
use super::error::{ScoringError, ValidationError};
use super::selection::{BuildingConfiguration, LevelSelection};
use crate::reference::ReferenceData;

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// One applied level change and the total it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeStep {
    pub service: String,
    pub from_level: u32,
    pub to_level: u32,
    pub total_sri: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradePlan {
    pub upgrades: LevelSelection,
    pub new_score: f64,
    pub original_score: f64,
    pub original_levels: LevelSelection,
    /// Drop in total when only that service is reverted. These need not add
    /// up to `new_score - original_score`.
    pub individual_increases: BTreeMap<String, f64>,
    pub steps: Vec<UpgradeStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpgradeOutcome {
    Found(UpgradePlan),
    NotFound {
        current_score: f64,
        target_score: f64,
        steps_explored: usize,
    },
}

impl UpgradeOutcome {
    pub fn plan(&self) -> Option<&UpgradePlan> {
        match self {
            Self::Found(plan) => Some(plan),
            Self::NotFound { .. } => None,
        }
    }
}

pub struct UpgradeExplorer<D: ?Sized> {
    calculator: SriCalculator<D>,
    max_depth: usize,
}

impl<D> UpgradeExplorer<D>
where
    D: ReferenceData + ?Sized,
{
    pub fn new(calculator: SriCalculator<D>) -> Self {
        Self {
            calculator,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn find_upgrade(
        &self,
        config: &BuildingConfiguration,
        target: f64,
    ) -> Result<UpgradeOutcome, ScoringError> {
        if !target.is_finite() {
            return Err(ValidationError::InvalidTarget.into());
        }

        let original_score = self.calculator.calculate(config)?.total_sri;
        if target <= original_score {
            return Err(ValidationError::TargetNotAboveCurrent {
                target,
                current: original_score,
            }
            .into());
        }

        let mut working = config.clone();
        let mut visited = HashSet::from([working.levels.fingerprint()]);
        let mut steps: Vec<UpgradeStep> = Vec::new();

        while steps.len() < self.max_depth {
            let Some((service, from_level, to_level)) = self.next_candidate(&working.levels)?
            else {
                debug!(steps = steps.len(), "no service has a further level");
                break;
            };

            working.levels.set_single(&service, to_level);
            if !visited.insert(working.levels.fingerprint()) {
                debug!(%service, to_level, "selection already explored");
                break;
            }

            let total_sri = self.calculator.calculate(&working)?.total_sri;
            debug!(%service, from_level, to_level, total_sri, "applied upgrade step");
            steps.push(UpgradeStep {
                service,
                from_level,
                to_level,
                total_sri,
            });

            if total_sri >= target {
                let plan = self.attribute(config, working, original_score, total_sri, steps)?;
                return Ok(UpgradeOutcome::Found(plan));
            }
        }

        Ok(UpgradeOutcome::NotFound {
            current_score: original_score,
            target_score: target,
            steps_explored: steps.len(),
        })
    }

    /// First service, in code order, whose next level exists.
    fn next_candidate(
        &self,
        levels: &LevelSelection,
    ) -> Result<Option<(String, u32, u32)>, ScoringError> {
        let reference = self.calculator.reference();
        for service in levels.services() {
            let Some(current) = levels.current_level(service) else {
                continue;
            };
            if let Some(row) = reference.next_level(service, current)? {
                return Ok(Some((service.to_string(), current, row.level)));
            }
        }
        Ok(None)
    }

    fn attribute(
        &self,
        original: &BuildingConfiguration,
        upgraded: BuildingConfiguration,
        original_score: f64,
        new_score: f64,
        steps: Vec<UpgradeStep>,
    ) -> Result<UpgradePlan, ScoringError> {
        let mut individual_increases = BTreeMap::new();

        for (service, mix) in upgraded.levels.iter() {
            let original_mix = original.levels.get(service);
            let increase = match original_mix {
                Some(original_mix) if original_mix != mix => {
                    let mut reverted = upgraded.clone();
                    reverted.levels.set_mix(service, original_mix.clone());
                    let reverted_score = self.calculator.calculate(&reverted)?.total_sri;
                    round2(new_score - reverted_score)
                }
                _ => 0.0,
            };
            individual_increases.insert(service.to_string(), increase);
        }

        Ok(UpgradePlan {
            upgrades: upgraded.levels,
            new_score,
            original_score,
            original_levels: original.levels.clone(),
            individual_increases,
            steps,
        })
    }
}
