use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::ValidationError;

/// The seven fixed evaluation dimensions, in reference-dataset column order
/// (`score_cr1`..`score_cr7`, `dw_cr1`..`dw_cr7`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImpactCriterion {
    #[serde(rename = "Energy efficiency")]
    EnergyEfficiency,
    #[serde(rename = "Maintenance and fault prediction")]
    MaintenanceAndFaultPrediction,
    #[serde(rename = "Comfort")]
    Comfort,
    #[serde(rename = "Convenience")]
    Convenience,
    #[serde(rename = "Health, wellbeing and accessibility")]
    HealthWellbeingAndAccessibility,
    #[serde(rename = "Information to occupants")]
    InformationToOccupants,
    #[serde(rename = "Energy, flexibility and storage")]
    EnergyFlexibilityAndStorage,
}

impl ImpactCriterion {
    pub const COUNT: usize = 7;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::EnergyEfficiency,
            Self::MaintenanceAndFaultPrediction,
            Self::Comfort,
            Self::Convenience,
            Self::HealthWellbeingAndAccessibility,
            Self::InformationToOccupants,
            Self::EnergyFlexibilityAndStorage,
        ]
    }

    pub const fn index(self) -> usize {
        match self {
            Self::EnergyEfficiency => 0,
            Self::MaintenanceAndFaultPrediction => 1,
            Self::Comfort => 2,
            Self::Convenience => 3,
            Self::HealthWellbeingAndAccessibility => 4,
            Self::InformationToOccupants => 5,
            Self::EnergyFlexibilityAndStorage => 6,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EnergyEfficiency => "Energy efficiency",
            Self::MaintenanceAndFaultPrediction => "Maintenance and fault prediction",
            Self::Comfort => "Comfort",
            Self::Convenience => "Convenience",
            Self::HealthWellbeingAndAccessibility => "Health, wellbeing and accessibility",
            Self::InformationToOccupants => "Information to occupants",
            Self::EnergyFlexibilityAndStorage => "Energy, flexibility and storage",
        }
    }
}

impl fmt::Display for ImpactCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ImpactCriterion {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ordered()
            .into_iter()
            .find(|criterion| criterion.label() == trimmed)
            .ok_or_else(|| ValidationError::UnknownImpactCriterion(trimmed.to_string()))
    }
}

/// One number per impact criterion. Used for level scores, domain weights and
/// running sums alike.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CriterionScores([f64; ImpactCriterion::COUNT]);

impl CriterionScores {
    pub const fn new(values: [f64; ImpactCriterion::COUNT]) -> Self {
        Self(values)
    }

    pub const fn zero() -> Self {
        Self([0.0; ImpactCriterion::COUNT])
    }

    pub fn get(&self, criterion: ImpactCriterion) -> f64 {
        self.0[criterion.index()]
    }

    /// Adds `other * factor` component-wise.
    pub fn add_scaled(&mut self, other: &CriterionScores, factor: f64) {
        for (acc, value) in self.0.iter_mut().zip(other.0.iter()) {
            *acc += value * factor;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ImpactCriterion, f64)> + '_ {
        ImpactCriterion::ordered()
            .into_iter()
            .map(move |criterion| (criterion, self.get(criterion)))
    }

    pub fn values(&self) -> &[f64; ImpactCriterion::COUNT] {
        &self.0
    }
}

impl Index<ImpactCriterion> for CriterionScores {
    type Output = f64;

    fn index(&self, criterion: ImpactCriterion) -> &Self::Output {
        &self.0[criterion.index()]
    }
}

impl IndexMut<ImpactCriterion> for CriterionScores {
    fn index_mut(&mut self, criterion: ImpactCriterion) -> &mut Self::Output {
        &mut self.0[criterion.index()]
    }
}

/// Fixed per-criterion weights used for domain and key-functionality aggregation.
///
/// Independent of building type and zone; not to be confused with the
/// per-(type, zone, domain) weights held by the reference data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactWeights(CriterionScores);

impl ImpactWeights {
    pub const fn new(weights: CriterionScores) -> Self {
        Self(weights)
    }

    pub const fn standard() -> Self {
        Self(CriterionScores::new([
            0.166666667,
            0.333333333,
            0.083333333,
            0.083333333,
            0.083333333,
            0.083333333,
            0.166666667,
        ]))
    }

    pub fn weight(&self, criterion: ImpactCriterion) -> f64 {
        self.0.get(criterion)
    }
}

impl Default for ImpactWeights {
    fn default() -> Self {
        Self::standard()
    }
}

/// Top-level grouping of impact criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyFunctionality {
    #[serde(rename = "Energy Performance and Operation")]
    EnergyPerformanceAndOperation,
    #[serde(rename = "Response to User Needs")]
    ResponseToUserNeeds,
    #[serde(rename = "Energy Flexibility")]
    EnergyFlexibility,
}

impl KeyFunctionality {
    pub const fn ordered() -> [Self; 3] {
        [
            Self::EnergyPerformanceAndOperation,
            Self::ResponseToUserNeeds,
            Self::EnergyFlexibility,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EnergyPerformanceAndOperation => "Energy Performance and Operation",
            Self::ResponseToUserNeeds => "Response to User Needs",
            Self::EnergyFlexibility => "Energy Flexibility",
        }
    }

    pub const fn criteria(self) -> &'static [ImpactCriterion] {
        match self {
            Self::EnergyPerformanceAndOperation => &[
                ImpactCriterion::EnergyEfficiency,
                ImpactCriterion::MaintenanceAndFaultPrediction,
            ],
            Self::ResponseToUserNeeds => &[
                ImpactCriterion::Comfort,
                ImpactCriterion::Convenience,
                ImpactCriterion::InformationToOccupants,
                ImpactCriterion::HealthWellbeingAndAccessibility,
            ],
            Self::EnergyFlexibility => &[ImpactCriterion::EnergyFlexibilityAndStorage],
        }
    }
}

impl fmt::Display for KeyFunctionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A `(domain, impact criterion)` pair, rendered as `"Heating-Energy efficiency"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainCriterionKey {
    pub domain: String,
    pub criterion: ImpactCriterion,
}

impl DomainCriterionKey {
    pub fn new(domain: impl Into<String>, criterion: ImpactCriterion) -> Self {
        Self {
            domain: domain.into(),
            criterion,
        }
    }
}

impl fmt::Display for DomainCriterionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.domain, self.criterion.label())
    }
}

impl FromStr for DomainCriterionKey {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (domain, criterion) = value
            .split_once('-')
            .ok_or_else(|| ValidationError::MalformedKey(value.to_string()))?;
        if domain.trim().is_empty() {
            return Err(ValidationError::MalformedKey(value.to_string()));
        }
        Ok(Self::new(domain.trim(), criterion.parse()?))
    }
}

impl Serialize for DomainCriterionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DomainCriterionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criterion_labels_round_trip_through_from_str() {
        for criterion in ImpactCriterion::ordered() {
            assert_eq!(criterion.label().parse::<ImpactCriterion>(), Ok(criterion));
        }
        assert_eq!(
            "Happiness".parse::<ImpactCriterion>(),
            Err(ValidationError::UnknownImpactCriterion("Happiness".to_string()))
        );
    }

    #[test]
    fn key_splits_on_first_separator() {
        let key: DomainCriterionKey = "Heating-Energy, flexibility and storage"
            .parse()
            .expect("valid key");
        assert_eq!(key.domain, "Heating");
        assert_eq!(key.criterion, ImpactCriterion::EnergyFlexibilityAndStorage);
        assert_eq!(key.to_string(), "Heating-Energy, flexibility and storage");
    }

    #[test]
    fn key_without_separator_is_rejected() {
        assert!(matches!(
            "HeatingComfort".parse::<DomainCriterionKey>(),
            Err(ValidationError::MalformedKey(_))
        ));
        assert!(matches!(
            "Heating-Warmth".parse::<DomainCriterionKey>(),
            Err(ValidationError::UnknownImpactCriterion(_))
        ));
    }

    #[test]
    fn key_functionality_groups_cover_every_criterion_once() {
        let mut seen: Vec<ImpactCriterion> = KeyFunctionality::ordered()
            .into_iter()
            .flat_map(|functionality| functionality.criteria().iter().copied())
            .collect();
        seen.sort();
        assert_eq!(seen, ImpactCriterion::ordered().to_vec());
    }

    #[test]
    fn add_scaled_accumulates_per_criterion() {
        let mut acc = CriterionScores::zero();
        let row = CriterionScores::new([10.0, 0.0, 2.0, 0.0, 0.0, 0.0, 4.0]);
        acc.add_scaled(&row, 0.5);
        acc.add_scaled(&row, 0.5);
        assert_eq!(acc, row);
        assert_eq!(acc[ImpactCriterion::EnergyFlexibilityAndStorage], 4.0);
    }

    #[test]
    fn keys_serialize_as_json_map_keys() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(
            DomainCriterionKey::new("Lighting", ImpactCriterion::Comfort),
            12.5,
        );
        let json = serde_json::to_value(&map).expect("serializes");
        assert_eq!(json["Lighting-Comfort"], 12.5);
    }
}
