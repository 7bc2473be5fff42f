use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{BuildingDraft, BuildingId, BuildingRecord, StoredScores};
use super::repository::{BuildingRepository, RepositoryError};
use crate::reference::ReferenceData;
use crate::scoring::{
    LevelSelection, ScoringError, SriCalculator, SriReport, UpgradeExplorer, UpgradeOutcome,
    ValidationError, DEFAULT_MAX_DEPTH,
};

/// Service composing building storage with the scoring engine.
pub struct BuildingService<R, D: ?Sized> {
    repository: Arc<R>,
    calculator: SriCalculator<D>,
    max_depth: usize,
    sequence: AtomicU64,
}

impl<R, D> BuildingService<R, D>
where
    R: BuildingRepository + 'static,
    D: ReferenceData + ?Sized + 'static,
{
    pub fn new(repository: Arc<R>, calculator: SriCalculator<D>) -> Self {
        Self {
            repository,
            calculator,
            max_depth: DEFAULT_MAX_DEPTH,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn calculator(&self) -> &SriCalculator<D> {
        &self.calculator
    }

    pub fn register(&self, draft: BuildingDraft) -> Result<BuildingRecord, BuildingServiceError> {
        draft.validate()?;
        let id = BuildingId(self.sequence.fetch_add(1, Ordering::Relaxed));
        let stored = self
            .repository
            .insert(BuildingRecord::from_draft(id, draft))?;
        info!(
            building_id = %stored.id,
            building_type = %stored.building_type,
            zone = %stored.zone,
            "building registered"
        );
        Ok(stored)
    }

    pub fn get(&self, id: BuildingId) -> Result<BuildingRecord, BuildingServiceError> {
        let record = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn list(&self) -> Result<Vec<BuildingRecord>, BuildingServiceError> {
        Ok(self.repository.list()?)
    }

    /// Replaces the building's domain set. Previously stored scores no longer
    /// describe the building and are dropped.
    pub fn set_domains(
        &self,
        id: BuildingId,
        domains: BTreeSet<String>,
    ) -> Result<BuildingRecord, BuildingServiceError> {
        let mut record = self.get(id)?;
        record.domains = domains
            .into_iter()
            .map(|domain| domain.trim().to_string())
            .filter(|domain| !domain.is_empty())
            .collect();
        record.scores = None;
        self.repository.update(record.clone())?;
        Ok(record)
    }

    pub fn set_levels(
        &self,
        id: BuildingId,
        levels: LevelSelection,
    ) -> Result<BuildingRecord, BuildingServiceError> {
        levels.validate()?;
        let mut record = self.get(id)?;
        record.levels = levels;
        record.scores = None;
        self.repository.update(record.clone())?;
        Ok(record)
    }

    /// Computes the report for the stored configuration and persists it.
    pub fn score(&self, id: BuildingId) -> Result<SriReport, BuildingServiceError> {
        let mut record = self.get(id)?;
        let report = self.calculator.calculate(&record.configuration())?;
        info!(building_id = %id, total_sri = report.total_sri, "scores computed");

        record.scores = Some(StoredScores {
            report: report.clone(),
            levels: record.levels.clone(),
            scored_at: Utc::now(),
        });
        self.repository.update(record)?;
        Ok(report)
    }

    pub fn stored_scores(&self, id: BuildingId) -> Result<StoredScores, BuildingServiceError> {
        self.get(id)?
            .scores
            .ok_or(BuildingServiceError::NotScored(id))
    }

    /// Searches for an upgrade path from the stored configuration. With `apply`,
    /// a found plan's levels and the resulting report replace the stored ones.
    pub fn upgrade(
        &self,
        id: BuildingId,
        target: f64,
        apply: bool,
    ) -> Result<UpgradeOutcome, BuildingServiceError> {
        let mut record = self.get(id)?;
        let outcome = UpgradeExplorer::new(self.calculator.clone())
            .with_max_depth(self.max_depth)
            .find_upgrade(&record.configuration(), target)?;

        match &outcome {
            UpgradeOutcome::Found(plan) => {
                info!(
                    building_id = %id,
                    target,
                    new_score = plan.new_score,
                    steps = plan.steps.len(),
                    apply,
                    "upgrade plan found"
                );
                if apply {
                    record.levels = plan.upgrades.clone();
                    let report = self.calculator.calculate(&record.configuration())?;
                    record.scores = Some(StoredScores {
                        report,
                        levels: record.levels.clone(),
                        scored_at: Utc::now(),
                    });
                    self.repository.update(record)?;
                }
            }
            UpgradeOutcome::NotFound { steps_explored, .. } => {
                info!(building_id = %id, target, steps_explored, "no upgrade reaches target");
            }
        }

        Ok(outcome)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildingServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("building {0} has not been scored yet")]
    NotScored(BuildingId),
}
