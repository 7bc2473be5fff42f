use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{BuildingConfiguration, LevelSelection, SriReport, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingId(pub u64);

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registration payload, as submitted by the building form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingDraft {
    #[serde(alias = "building_name")]
    pub name: String,
    pub building_type: String,
    pub zone: String,
    #[serde(default, alias = "building_usage")]
    pub usage: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub year: Option<u16>,
}

impl BuildingDraft {
    pub fn new(
        name: impl Into<String>,
        building_type: impl Into<String>,
        zone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            building_type: building_type.into(),
            zone: zone.into(),
            usage: None,
            country: None,
            city: None,
            year: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("name", &self.name),
            ("building_type", &self.building_type),
            ("zone", &self.zone),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField { field });
            }
        }
        Ok(())
    }
}

/// A report persisted together with the selection it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredScores {
    pub report: SriReport,
    pub levels: LevelSelection,
    pub scored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub id: BuildingId,
    pub name: String,
    pub building_type: String,
    pub zone: String,
    pub usage: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub year: Option<u16>,
    pub domains: BTreeSet<String>,
    pub levels: LevelSelection,
    pub scores: Option<StoredScores>,
    pub created_at: DateTime<Utc>,
}

impl BuildingRecord {
    pub fn from_draft(id: BuildingId, draft: BuildingDraft) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            building_type: draft.building_type.trim().to_string(),
            zone: draft.zone.trim().to_string(),
            usage: draft.usage,
            country: draft.country,
            city: draft.city,
            year: draft.year,
            domains: BTreeSet::new(),
            levels: LevelSelection::new(),
            scores: None,
            created_at: Utc::now(),
        }
    }

    /// The scoring input described by this building's current state.
    pub fn configuration(&self) -> BuildingConfiguration {
        BuildingConfiguration {
            building_type: self.building_type.clone(),
            zone: self.zone.clone(),
            domains: self.domains.clone(),
            levels: self.levels.clone(),
        }
    }
}
