use std::sync::Arc;

use super::aggregate::{self, SriReport};
use super::criteria::ImpactWeights;
use super::error::ScoringError;
use super::evaluator::{DomainScores, ScoreEvaluator};
use super::selection::BuildingConfiguration;
use crate::reference::ReferenceData;

/// Scores building configurations against an injected reference dataset.
pub struct SriCalculator<D: ?Sized> {
    reference: Arc<D>,
    impact_weights: ImpactWeights,
}

impl<D: ?Sized> Clone for SriCalculator<D> {
    fn clone(&self) -> Self {
        Self {
            reference: Arc::clone(&self.reference),
            impact_weights: self.impact_weights,
        }
    }
}

impl<D> SriCalculator<D>
where
    D: ReferenceData + ?Sized,
{
    pub fn new(reference: Arc<D>) -> Self {
        Self {
            reference,
            impact_weights: ImpactWeights::standard(),
        }
    }

    pub fn with_impact_weights(mut self, impact_weights: ImpactWeights) -> Self {
        self.impact_weights = impact_weights;
        self
    }

    pub fn reference(&self) -> &Arc<D> {
        &self.reference
    }

    pub fn impact_weights(&self) -> &ImpactWeights {
        &self.impact_weights
    }

    pub fn evaluate(&self, config: &BuildingConfiguration) -> Result<DomainScores, ScoringError> {
        let scores =
            ScoreEvaluator::new(self.reference.as_ref()).evaluate(&config.domains, &config.levels)?;
        Ok(scores)
    }

    pub fn calculate(&self, config: &BuildingConfiguration) -> Result<SriReport, ScoringError> {
        config.validate()?;
        let scores = self.evaluate(config)?;
        aggregate::aggregate(
            self.reference.as_ref(),
            &config.building_type,
            &config.zone,
            &scores,
            &self.impact_weights,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{
        fixtures, DomainCriterionKey, ImpactCriterion, KeyFunctionality, LevelSelection,
        ValidationError,
    };

    fn calculator() -> SriCalculator<dyn ReferenceData> {
        let reference: Arc<dyn ReferenceData> = Arc::new(fixtures::heating_catalog());
        SriCalculator::new(reference)
    }

    fn heating_at(level: u32) -> BuildingConfiguration {
        BuildingConfiguration::new("Office", "Temperate")
            .with_domain("Heating")
            .with_levels(LevelSelection::new().with_single("H1", level))
    }

    #[test]
    fn scores_single_heating_service_end_to_end() {
        let report = calculator().calculate(&heating_at(1)).expect("scores");

        let key = |criterion| DomainCriterionKey::new("Heating", criterion);
        assert_eq!(report.smart_readiness_scores[&key(ImpactCriterion::EnergyEfficiency)], 33.33);
        assert_eq!(report.smart_readiness_scores[&key(ImpactCriterion::Comfort)], 50.0);
        assert_eq!(report.smart_readiness_scores[&key(ImpactCriterion::Convenience)], 50.0);
        assert_eq!(
            report.smart_readiness_scores[&key(ImpactCriterion::HealthWellbeingAndAccessibility)],
            0.0
        );
        assert_eq!(report.sr_domains["Heating"], 16.67);
        assert_eq!(
            report.srf_scores[&KeyFunctionality::EnergyPerformanceAndOperation],
            5.56
        );
        assert_eq!(report.srf_scores[&KeyFunctionality::ResponseToUserNeeds], 8.33);
        assert_eq!(report.srf_scores[&KeyFunctionality::EnergyFlexibility], 0.0);
        assert_eq!(report.total_sri, 4.63);
    }

    #[test]
    fn top_level_reaches_every_attainable_criterion() {
        let report = calculator().calculate(&heating_at(3)).expect("scores");

        assert_eq!(report.sr_domains["Heating"], 100.0);
        assert_eq!(report.sr_impact_criteria[&ImpactCriterion::Comfort], 100.0);
        // no heating level carries a health score
        assert_eq!(
            report.sr_impact_criteria[&ImpactCriterion::HealthWellbeingAndAccessibility],
            0.0
        );
        assert_eq!(report.total_sri, 30.56);
    }

    #[test]
    fn empty_domain_set_scores_zero() {
        let config = BuildingConfiguration::new("Office", "Temperate")
            .with_levels(LevelSelection::new().with_single("H1", 2));

        let report = calculator().calculate(&config).expect("scores");

        assert!(report.smart_readiness_scores.is_empty());
        assert!(report.sr_domains.is_empty());
        assert!(report.sr_impact_criteria.values().all(|value| *value == 0.0));
        assert_eq!(report.total_sri, 0.0);
    }

    #[test]
    fn unknown_zone_is_a_lookup_error() {
        let mut config = heating_at(1);
        config.zone = "Arctic".to_string();

        let error = calculator().calculate(&config).expect_err("no arctic weights");
        assert!(matches!(error, ScoringError::Lookup(_)));
        assert!(error.is_client_error());
    }

    #[test]
    fn invalid_percentages_fail_before_scoring() {
        let config = BuildingConfiguration::new("Office", "Temperate")
            .with_domain("Heating")
            .with_levels(LevelSelection::new().with_mix("H1", &[(1, 150.0)]));

        let error = calculator().calculate(&config).expect_err("invalid percentage");
        assert!(matches!(
            error,
            ScoringError::Validation(ValidationError::InvalidPercentage { .. })
        ));
    }

    #[test]
    fn report_serializes_with_display_labels() {
        let report = calculator().calculate(&heating_at(1)).expect("scores");
        let json = serde_json::to_value(&report).expect("serializes");

        assert_eq!(json["smart_readiness_scores"]["Heating-Energy efficiency"], 33.33);
        assert_eq!(json["srf_scores"]["Response to User Needs"], 8.33);
        assert_eq!(json["total_sri"], 4.63);
    }
}
