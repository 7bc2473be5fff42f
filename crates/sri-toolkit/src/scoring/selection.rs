use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Percentage weight per chosen level of one service.
pub type LevelMix = BTreeMap<u32, f64>;

/// Chosen level (or split across levels) for every service of interest, keyed by
/// service code.
///
/// Deserializes from either `{"H-1a": {"2": 60, "3": 40}}` or the shorthand
/// `{"H-1a": 2}`, which selects level 2 at 100%.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, LevelChoice>")]
pub struct LevelSelection(BTreeMap<String, LevelMix>);

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LevelChoice {
    Single(u32),
    Mix(BTreeMap<String, f64>),
}

impl TryFrom<BTreeMap<String, LevelChoice>> for LevelSelection {
    type Error = ValidationError;

    fn try_from(raw: BTreeMap<String, LevelChoice>) -> Result<Self, Self::Error> {
        let mut selection = LevelSelection::new();
        for (service, choice) in raw {
            match choice {
                LevelChoice::Single(level) => selection.set_single(&service, level),
                LevelChoice::Mix(mix) => {
                    let mut parsed = LevelMix::new();
                    for (level, percentage) in mix {
                        let level = level.trim().parse::<u32>().map_err(|_| {
                            ValidationError::InvalidLevel {
                                service: service.clone(),
                                value: level.clone(),
                            }
                        })?;
                        parsed.insert(level, percentage);
                    }
                    selection.set_mix(&service, parsed);
                }
            }
        }
        Ok(selection)
    }
}

impl LevelSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects exactly one level for the service at 100%.
    pub fn set_single(&mut self, service: &str, level: u32) {
        self.0
            .insert(service.to_string(), LevelMix::from([(level, 100.0)]));
    }

    pub fn set_mix(&mut self, service: &str, mix: LevelMix) {
        self.0.insert(service.to_string(), mix);
    }

    pub fn with_single(mut self, service: &str, level: u32) -> Self {
        self.set_single(service, level);
        self
    }

    pub fn with_mix(mut self, service: &str, mix: &[(u32, f64)]) -> Self {
        self.set_mix(service, mix.iter().copied().collect());
        self
    }

    pub fn get(&self, service: &str) -> Option<&LevelMix> {
        self.0.get(service)
    }

    pub fn contains(&self, service: &str) -> bool {
        self.0.contains_key(service)
    }

    /// Percentage assigned to `level` of `service`, if that exact level was chosen.
    pub fn percentage(&self, service: &str, level: u32) -> Option<f64> {
        self.0.get(service).and_then(|mix| mix.get(&level)).copied()
    }

    /// Highest level key present for the service.
    pub fn current_level(&self, service: &str) -> Option<u32> {
        self.0
            .get(service)
            .and_then(|mix| mix.keys().next_back())
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LevelMix)> {
        self.0.iter().map(|(service, mix)| (service.as_str(), mix))
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hashable identity of the selection, used to detect revisited configurations.
    pub(crate) fn fingerprint(&self) -> Vec<(String, Vec<(u32, u64)>)> {
        self.0
            .iter()
            .map(|(service, mix)| {
                let levels = mix
                    .iter()
                    .map(|(level, percentage)| (*level, percentage.to_bits()))
                    .collect();
                (service.clone(), levels)
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (service, mix) in &self.0 {
            for (level, percentage) in mix {
                if !percentage.is_finite() || *percentage < 0.0 || *percentage > 100.0 {
                    return Err(ValidationError::InvalidPercentage {
                        service: service.clone(),
                        level: *level,
                        value: *percentage,
                    });
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, LevelMix)> for LevelSelection {
    fn from_iter<T: IntoIterator<Item = (String, LevelMix)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Everything the engine needs to score one building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingConfiguration {
    #[serde(alias = "buildingType")]
    pub building_type: String,
    pub zone: String,
    #[serde(default)]
    pub domains: BTreeSet<String>,
    #[serde(default, alias = "lev")]
    pub levels: LevelSelection,
}

impl BuildingConfiguration {
    pub fn new(building_type: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            building_type: building_type.into(),
            zone: zone.into(),
            domains: BTreeSet::new(),
            levels: LevelSelection::new(),
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domains.insert(domain.into());
        self
    }

    pub fn with_levels(mut self, levels: LevelSelection) -> Self {
        self.levels = levels;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.building_type.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "building_type",
            });
        }
        if self.zone.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "zone" });
        }
        self.levels.validate()
    }
}
