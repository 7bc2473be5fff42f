use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{BuildingDraft, BuildingId};
use super::repository::{BuildingRepository, RepositoryError};
use super::service::{BuildingService, BuildingServiceError};
use crate::reference::ReferenceData;
use crate::scoring::LevelSelection;

type SharedService<R, D> = State<Arc<BuildingService<R, D>>>;

#[derive(Debug, Deserialize)]
pub struct DomainsRequest {
    pub domains: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
pub struct LevelsRequest {
    #[serde(alias = "lev")]
    pub levels: LevelSelection,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeRequest {
    #[serde(alias = "targetSri")]
    pub target_sri: f64,
    #[serde(default)]
    pub apply: bool,
}

/// Router builder exposing building registration, scoring and upgrade endpoints.
pub fn building_router<R, D>(service: Arc<BuildingService<R, D>>) -> Router
where
    R: BuildingRepository + 'static,
    D: ReferenceData + ?Sized + 'static,
{
    Router::new()
        .route(
            "/api/v1/buildings",
            post(register_handler::<R, D>).get(list_handler::<R, D>),
        )
        .route("/api/v1/buildings/:id", get(get_handler::<R, D>))
        .route(
            "/api/v1/buildings/:id/domains",
            put(domains_handler::<R, D>),
        )
        .route("/api/v1/buildings/:id/levels", put(levels_handler::<R, D>))
        .route(
            "/api/v1/buildings/:id/sri",
            post(score_handler::<R, D>).get(stored_scores_handler::<R, D>),
        )
        .route(
            "/api/v1/buildings/:id/upgrade",
            post(upgrade_handler::<R, D>),
        )
        .with_state(service)
}

pub(crate) fn error_response(error: BuildingServiceError) -> Response {
    let status = match &error {
        BuildingServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        BuildingServiceError::Scoring(scoring) if scoring.is_client_error() => {
            StatusCode::BAD_REQUEST
        }
        BuildingServiceError::Repository(RepositoryError::NotFound)
        | BuildingServiceError::NotScored(_) => StatusCode::NOT_FOUND,
        BuildingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        BuildingServiceError::Scoring(_) | BuildingServiceError::Repository(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, BuildingServiceError>,
) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_handler<R, D>(
    State(service): SharedService<R, D>,
    Json(draft): Json<BuildingDraft>,
) -> Response
where
    R: BuildingRepository + 'static,
    D: ReferenceData + ?Sized + 'static,
{
    respond(StatusCode::CREATED, service.register(draft))
}

async fn list_handler<R, D>(State(service): SharedService<R, D>) -> Response
where
    R: BuildingRepository + 'static,
    D: ReferenceData + ?Sized + 'static,
{
    respond(StatusCode::OK, service.list())
}

async fn get_handler<R, D>(State(service): SharedService<R, D>, Path(id): Path<u64>) -> Response
where
    R: BuildingRepository + 'static,
    D: ReferenceData + ?Sized + 'static,
{
    respond(StatusCode::OK, service.get(BuildingId(id)))
}

async fn domains_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(id): Path<u64>,
    Json(request): Json<DomainsRequest>,
) -> Response
where
    R: BuildingRepository + 'static,
    D: ReferenceData + ?Sized + 'static,
{
    respond(
        StatusCode::OK,
        service.set_domains(BuildingId(id), request.domains),
    )
}

async fn levels_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(id): Path<u64>,
    Json(request): Json<LevelsRequest>,
) -> Response
where
    R: BuildingRepository + 'static,
    D: ReferenceData + ?Sized + 'static,
{
    respond(StatusCode::OK, service.set_levels(BuildingId(id), request.levels))
}

pub(crate) async fn score_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(id): Path<u64>,
) -> Response
where
    R: BuildingRepository + 'static,
    D: ReferenceData + ?Sized + 'static,
{
    respond(StatusCode::OK, service.score(BuildingId(id)))
}

async fn stored_scores_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(id): Path<u64>,
) -> Response
where
    R: BuildingRepository + 'static,
    D: ReferenceData + ?Sized + 'static,
{
    respond(StatusCode::OK, service.stored_scores(BuildingId(id)))
}

async fn upgrade_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(id): Path<u64>,
    Json(request): Json<UpgradeRequest>,
) -> Response
where
    R: BuildingRepository + 'static,
    D: ReferenceData + ?Sized + 'static,
{
    respond(
        StatusCode::OK,
        service.upgrade(BuildingId(id), request.target_sri, request.apply),
    )
}
