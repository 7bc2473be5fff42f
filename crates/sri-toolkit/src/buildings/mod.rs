//! Registered buildings: their scoring configuration, persisted reports, and
//! upgrade planning against the stored state.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{BuildingDraft, BuildingId, BuildingRecord, StoredScores};
pub use repository::{BuildingRepository, RepositoryError};
pub use router::{building_router, DomainsRequest, LevelsRequest, UpgradeRequest};
pub use service::{BuildingService, BuildingServiceError};
