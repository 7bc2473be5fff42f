use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::buildings::domain::{BuildingDraft, BuildingId, BuildingRecord};
use crate::buildings::repository::{BuildingRepository, RepositoryError};
use crate::buildings::service::BuildingService;
use crate::reference::ReferenceCatalog;
use crate::scoring::{fixtures, LevelSelection, SriCalculator};

pub(super) type TestService = BuildingService<MemoryRepository, ReferenceCatalog>;

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<BTreeMap<BuildingId, BuildingRecord>>>,
}

impl BuildingRepository for MemoryRepository {
    fn insert(&self, record: BuildingRecord) -> Result<BuildingRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, record: BuildingRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id, record);
        Ok(())
    }

    fn fetch(&self, id: BuildingId) -> Result<Option<BuildingRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<BuildingRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl BuildingRepository for UnavailableRepository {
    fn insert(&self, _record: BuildingRecord) -> Result<BuildingRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: BuildingRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: BuildingId) -> Result<Option<BuildingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<BuildingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (Arc<TestService>, MemoryRepository) {
    let repository = MemoryRepository::default();
    let calculator = SriCalculator::new(Arc::new(fixtures::heating_catalog()));
    let service = BuildingService::new(Arc::new(repository.clone()), calculator);
    (Arc::new(service), repository)
}

pub(super) fn office_draft() -> BuildingDraft {
    BuildingDraft {
        usage: Some("Offices".to_string()),
        country: Some("Belgium".to_string()),
        city: Some("Ghent".to_string()),
        year: Some(1998),
        ..BuildingDraft::new("Harbour House", "Office", "Temperate")
    }
}

/// Registers the office draft with Heating selected and `H1` at `level`.
pub(super) fn heating_building(service: &TestService, level: u32) -> BuildingRecord {
    let record = service.register(office_draft()).expect("draft is valid");
    service
        .set_domains(record.id, ["Heating".to_string()].into_iter().collect())
        .expect("building exists");
    service
        .set_levels(record.id, LevelSelection::new().with_single("H1", level))
        .expect("building exists")
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    serde_json::from_slice(&bytes).expect("body is json")
}
