use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::parser::{self, DOMAIN_WEIGHTS_FILE, LEVELS_FILE, SERVICES_FILE};
use super::{DomainWeightRow, LevelRow, ReferenceData, ReferenceError, ServiceRow};
use crate::scoring::ValidationError;

const SAMPLE_LEVELS: &str = include_str!("../../data/reference/levels.csv");
const SAMPLE_DOMAIN_WEIGHTS: &str = include_str!("../../data/reference/domain_weights.csv");
const SAMPLE_SERVICES: &str = include_str!("../../data/reference/services.csv");

type WeightKey = (String, String, String);

/// Immutable, fully indexed reference dataset held in memory.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    levels_by_domain: BTreeMap<String, Vec<LevelRow>>,
    levels_by_service: BTreeMap<String, BTreeMap<u32, LevelRow>>,
    weights: BTreeMap<WeightKey, DomainWeightRow>,
    services: BTreeMap<String, ServiceRow>,
}

impl ReferenceCatalog {
    pub fn from_rows(
        levels: Vec<LevelRow>,
        weights: Vec<DomainWeightRow>,
        services: Vec<ServiceRow>,
    ) -> Result<Self, ReferenceLoadError> {
        let mut catalog = Self::default();

        for row in levels {
            let per_service = catalog
                .levels_by_service
                .entry(row.code.clone())
                .or_default();
            if per_service.contains_key(&row.level) {
                return Err(ReferenceLoadError::DuplicateLevel {
                    code: row.code,
                    level: row.level,
                });
            }
            per_service.insert(row.level, row.clone());
            catalog
                .levels_by_domain
                .entry(row.domain.clone())
                .or_default()
                .push(row);
        }

        for row in weights {
            let key = (
                row.building_type.clone(),
                row.zone.clone(),
                row.domain.clone(),
            );
            if catalog.weights.contains_key(&key) {
                return Err(ReferenceLoadError::DuplicateWeights {
                    building_type: row.building_type,
                    zone: row.zone,
                    domain: row.domain,
                });
            }
            catalog.weights.insert(key, row);
        }

        for row in services {
            catalog.services.insert(row.code.clone(), row);
        }

        Ok(catalog)
    }

    pub fn from_readers<L, W, S>(
        levels: L,
        domain_weights: W,
        services: S,
    ) -> Result<Self, ReferenceLoadError>
    where
        L: Read,
        W: Read,
        S: Read,
    {
        Self::from_rows(
            parser::parse_levels(levels)?,
            parser::parse_domain_weights(domain_weights)?,
            parser::parse_services(services)?,
        )
    }

    /// Loads `levels.csv`, `domain_weights.csv` and `services.csv` from `dir`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ReferenceLoadError> {
        let dir = dir.as_ref();
        let open = |name: &str| {
            let path = dir.join(name);
            File::open(&path).map_err(|source| ReferenceLoadError::Io { path, source })
        };

        Self::from_readers(
            open(LEVELS_FILE)?,
            open(DOMAIN_WEIGHTS_FILE)?,
            open(SERVICES_FILE)?,
        )
    }

    /// Dataset bundled with the crate, covering all nine domains for residential
    /// and non-residential buildings across five European zones.
    pub fn sample() -> Result<Self, ReferenceLoadError> {
        Self::from_readers(
            SAMPLE_LEVELS.as_bytes(),
            SAMPLE_DOMAIN_WEIGHTS.as_bytes(),
            SAMPLE_SERVICES.as_bytes(),
        )
    }

    pub fn level_count(&self) -> usize {
        self.levels_by_service.values().map(BTreeMap::len).sum()
    }

    pub fn summary(&self) -> Vec<DomainSummary> {
        self.domain_names()
            .into_iter()
            .map(|domain| {
                let rows = self
                    .levels_by_domain
                    .get(&domain)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let mut services: BTreeMap<String, u32> = BTreeMap::new();
                for row in rows {
                    let top = services.entry(row.code.clone()).or_insert(row.level);
                    *top = (*top).max(row.level);
                }
                for service in self.services_in(&domain) {
                    services.entry(service.code.clone()).or_insert(0);
                }
                let weight_rows = self
                    .weights
                    .keys()
                    .filter(|(_, _, weight_domain)| *weight_domain == domain)
                    .count();

                DomainSummary {
                    domain,
                    services: services
                        .into_iter()
                        .map(|(code, max_level)| ServiceSummary {
                            description: self
                                .services
                                .get(&code)
                                .map(|service| service.description.clone())
                                .unwrap_or_default(),
                            code,
                            max_level,
                        })
                        .collect(),
                    weight_rows,
                }
            })
            .collect()
    }

    fn services_in<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = &'a ServiceRow> + 'a {
        self.services
            .values()
            .filter(move |service| service.domain == domain)
    }

    fn domain_names(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.levels_by_domain.keys().cloned().collect();
        names.extend(self.services.values().map(|service| service.domain.clone()));
        names.into_iter().collect()
    }
}

impl ReferenceData for ReferenceCatalog {
    fn domain_weight(
        &self,
        building_type: &str,
        zone: &str,
        domain: &str,
    ) -> Result<Option<DomainWeightRow>, ReferenceError> {
        let key = (
            building_type.to_string(),
            zone.to_string(),
            domain.to_string(),
        );
        Ok(self.weights.get(&key).cloned())
    }

    fn levels_for_domain(&self, domain: &str) -> Result<Vec<LevelRow>, ReferenceError> {
        Ok(self
            .levels_by_domain
            .get(domain)
            .cloned()
            .unwrap_or_default())
    }

    fn level(&self, code: &str, level: u32) -> Result<Option<LevelRow>, ReferenceError> {
        Ok(self
            .levels_by_service
            .get(code)
            .and_then(|levels| levels.get(&level))
            .cloned())
    }

    fn services_for_domain(&self, domain: &str) -> Result<Vec<ServiceRow>, ReferenceError> {
        Ok(self.services_in(domain).cloned().collect())
    }

    fn domains(&self) -> Result<Vec<String>, ReferenceError> {
        Ok(self.domain_names())
    }
}

/// Per-domain overview used by the CLI catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainSummary {
    pub domain: String,
    pub services: Vec<ServiceSummary>,
    pub weight_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceSummary {
    pub code: String,
    pub description: String,
    pub max_level: u32,
}

/// Error raised while ingesting reference CSV files.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceLoadError {
    #[error("failed to read reference file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV data in {file}: {source}")]
    Csv {
        file: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("{file} line {line}: {source}")]
    Validation {
        file: &'static str,
        line: u64,
        #[source]
        source: ValidationError,
    },
    #[error("duplicate level {level} for service '{code}'")]
    DuplicateLevel { code: String, level: u32 },
    #[error("duplicate domain weights for '{building_type}' / '{zone}' / '{domain}'")]
    DuplicateWeights {
        building_type: String,
        zone: String,
        domain: String,
    },
}
