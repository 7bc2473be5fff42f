//! Read-only reference dataset: level score tables, domain weights and the
//! service catalog.

mod catalog;
mod parser;

pub use catalog::{DomainSummary, ReferenceCatalog, ReferenceLoadError, ServiceSummary};

use serde::{Deserialize, Serialize};

use crate::scoring::CriterionScores;

/// One readiness tier of one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRow {
    pub code: String,
    pub domain: String,
    pub level: u32,
    pub scores: CriterionScores,
    pub mandatory: bool,
}

/// Impact-criterion weights for one (building type, zone, domain) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainWeightRow {
    pub building_type: String,
    pub zone: String,
    pub domain: String,
    pub weights: CriterionScores,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRow {
    pub code: String,
    pub domain: String,
    pub group: String,
    pub description: String,
}

/// Lookup surface the scoring engine needs from storage.
pub trait ReferenceData: Send + Sync {
    fn domain_weight(
        &self,
        building_type: &str,
        zone: &str,
        domain: &str,
    ) -> Result<Option<DomainWeightRow>, ReferenceError>;

    fn levels_for_domain(&self, domain: &str) -> Result<Vec<LevelRow>, ReferenceError>;

    fn level(&self, code: &str, level: u32) -> Result<Option<LevelRow>, ReferenceError>;

    /// The row for `current + 1`, when the service defines one.
    fn next_level(&self, code: &str, current: u32) -> Result<Option<LevelRow>, ReferenceError> {
        match current.checked_add(1) {
            Some(next) => self.level(code, next),
            None => Ok(None),
        }
    }

    fn services_for_domain(&self, domain: &str) -> Result<Vec<ServiceRow>, ReferenceError>;

    fn domains(&self) -> Result<Vec<String>, ReferenceError>;
}

/// Failure of the backing store itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("reference data unavailable: {0}")]
    Unavailable(String),
}
