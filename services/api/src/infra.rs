use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use metrics_exporter_prometheus::PrometheusHandle;
use sri_toolkit::buildings::{BuildingId, BuildingRecord, BuildingRepository, RepositoryError};
use sri_toolkit::reference::{ReferenceCatalog, ReferenceData, ReferenceLoadError};
use sri_toolkit::scoring::SriCalculator;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) calculator: SriCalculator<dyn ReferenceData>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryBuildingRepository {
    records: Arc<Mutex<BTreeMap<BuildingId, BuildingRecord>>>,
}

impl InMemoryBuildingRepository {
    fn records(
        &self,
    ) -> Result<MutexGuard<'_, BTreeMap<BuildingId, BuildingRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl BuildingRepository for InMemoryBuildingRepository {
    fn insert(&self, record: BuildingRecord) -> Result<BuildingRecord, RepositoryError> {
        let mut guard = self.records()?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, record: BuildingRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records()?;
        if guard.contains_key(&record.id) {
            guard.insert(record.id, record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: BuildingId) -> Result<Option<BuildingRecord>, RepositoryError> {
        let guard = self.records()?;
        Ok(guard.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<BuildingRecord>, RepositoryError> {
        let guard = self.records()?;
        Ok(guard.values().cloned().collect())
    }
}

/// Reads the reference tables from `dir`, or falls back to the bundled sample.
pub(crate) fn load_catalog(dir: Option<&Path>) -> Result<ReferenceCatalog, ReferenceLoadError> {
    let catalog = match dir {
        Some(dir) => ReferenceCatalog::from_dir(dir)?,
        None => ReferenceCatalog::sample()?,
    };
    let source = dir
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|| "bundled sample".to_string());
    info!(%source, levels = catalog.level_count(), "reference data loaded");
    Ok(catalog)
}
