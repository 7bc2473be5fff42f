use super::domain::{BuildingId, BuildingRecord};

/// Storage abstraction so the service can be exercised without a database.
pub trait BuildingRepository: Send + Sync {
    fn insert(&self, record: BuildingRecord) -> Result<BuildingRecord, RepositoryError>;
    fn update(&self, record: BuildingRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: BuildingId) -> Result<Option<BuildingRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<BuildingRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("building already exists")]
    Conflict,
    #[error("building not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
