use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::json;
use sri_toolkit::buildings::{building_router, BuildingRepository, BuildingService};
use sri_toolkit::error::AppError;
use sri_toolkit::reference::ReferenceData;
use sri_toolkit::scoring::{BuildingConfiguration, SriReport};

use crate::infra::AppState;

pub(crate) fn with_sri_routes<R, D>(service: Arc<BuildingService<R, D>>) -> Router
where
    R: BuildingRepository + 'static,
    D: ReferenceData + ?Sized + 'static,
{
    building_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/sri/calculate", post(calculate_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Relaxed) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Stateless scoring of an ad-hoc configuration.
pub(crate) async fn calculate_endpoint(
    Extension(state): Extension<AppState>,
    Json(config): Json<BuildingConfiguration>,
) -> Result<Json<SriReport>, AppError> {
    let report = state.calculator.calculate(&config)?;
    Ok(Json(report))
}
