use std::collections::{BTreeMap, BTreeSet};

use super::criteria::{CriterionScores, DomainCriterionKey};
use super::selection::LevelSelection;
use crate::reference::{LevelRow, ReferenceData, ReferenceError};

/// Per-domain score vectors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DomainCriterionScores(BTreeMap<String, CriterionScores>);

impl DomainCriterionScores {
    pub fn domain(&self, domain: &str) -> Option<&CriterionScores> {
        self.0.get(domain)
    }

    pub fn value(&self, key: &DomainCriterionKey) -> f64 {
        self.0
            .get(&key.domain)
            .map(|scores| scores.get(key.criterion))
            .unwrap_or_default()
    }

    pub fn domains(&self) -> impl Iterator<Item = (&str, &CriterionScores)> {
        self.0.iter().map(|(domain, scores)| (domain.as_str(), scores))
    }

    /// Flattened `(domain, criterion) -> score` view.
    pub fn entries(&self) -> impl Iterator<Item = (DomainCriterionKey, f64)> + '_ {
        self.0.iter().flat_map(|(domain, scores)| {
            scores.iter().map(move |(criterion, value)| {
                (DomainCriterionKey::new(domain.clone(), criterion), value)
            })
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, domain: &str, scores: CriterionScores) {
        self.0.insert(domain.to_string(), scores);
    }
}

impl FromIterator<(String, CriterionScores)> for DomainCriterionScores {
    fn from_iter<T: IntoIterator<Item = (String, CriterionScores)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Achieved scores from the caller's selection next to the best attainable ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DomainScores {
    pub achieved: DomainCriterionScores,
    pub maximum: DomainCriterionScores,
}

pub struct ScoreEvaluator<'a, D: ?Sized> {
    reference: &'a D,
}

impl<'a, D> ScoreEvaluator<'a, D>
where
    D: ReferenceData + ?Sized,
{
    pub fn new(reference: &'a D) -> Self {
        Self { reference }
    }

    /// Scores every domain in `domains`; each one gets an entry even when the
    /// reference data holds no rows for it.
    pub fn evaluate(
        &self,
        domains: &BTreeSet<String>,
        selection: &LevelSelection,
    ) -> Result<DomainScores, ReferenceError> {
        let mut scores = DomainScores::default();

        for domain in domains {
            let rows = self.reference.levels_for_domain(domain)?;
            scores
                .maximum
                .insert(domain, maximum_for_domain(&rows, selection));
            scores
                .achieved
                .insert(domain, achieved_for_domain(&rows, selection));
        }

        Ok(scores)
    }
}

/// Sums the top level's scores of every selected service defined in the domain.
/// Independent of which level the caller picked.
fn maximum_for_domain(rows: &[LevelRow], selection: &LevelSelection) -> CriterionScores {
    let mut top_rows: BTreeMap<&str, &LevelRow> = BTreeMap::new();
    for row in rows.iter().filter(|row| selection.contains(&row.code)) {
        match top_rows.get(row.code.as_str()) {
            Some(current) if current.level >= row.level => {}
            _ => {
                top_rows.insert(row.code.as_str(), row);
            }
        }
    }

    let mut maximum = CriterionScores::zero();
    for row in top_rows.values() {
        maximum.add_scaled(&row.scores, 1.0);
    }
    maximum
}

fn achieved_for_domain(rows: &[LevelRow], selection: &LevelSelection) -> CriterionScores {
    let mut achieved = CriterionScores::zero();
    for row in rows {
        if let Some(percentage) = selection.percentage(&row.code, row.level) {
            achieved.add_scaled(&row.scores, percentage / 100.0);
        }
    }
    achieved
}
