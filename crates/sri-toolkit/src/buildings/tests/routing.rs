use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::buildings::router::{building_router, register_handler, score_handler};
use crate::buildings::service::BuildingService;
use crate::reference::ReferenceCatalog;
use crate::scoring::{fixtures, SriCalculator};

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn register_route_accepts_form_field_names() {
    let (service, _) = build_service();
    let router = building_router(service);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/buildings",
            json!({
                "building_name": "Harbour House",
                "building_type": "Office",
                "building_usage": "Offices",
                "zone": "Temperate",
                "country": "Belgium",
                "city": "Ghent",
                "year": 1998
            }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "Harbour House");
    assert_eq!(body["usage"], "Offices");
    assert_eq!(body["scores"], Value::Null);
}

#[tokio::test]
async fn register_handler_returns_bad_request_for_blank_name() {
    let (service, _) = build_service();
    let draft = crate::buildings::BuildingDraft::new("", "Office", "Temperate");

    let response = register_handler::<MemoryRepository, ReferenceCatalog>(
        State(service),
        axum::Json(draft),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "name must not be empty");
}

#[tokio::test]
async fn score_handler_returns_internal_error_on_repository_failure() {
    let calculator = SriCalculator::new(Arc::new(fixtures::heating_catalog()));
    let service = Arc::new(BuildingService::new(
        Arc::new(UnavailableRepository),
        calculator,
    ));

    let response =
        score_handler::<UnavailableRepository, ReferenceCatalog>(State(service), Path(1)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn full_building_flow_over_http() {
    let (service, _) = build_service();
    let router = building_router(service.clone());
    let record = service.register(office_draft()).expect("registers");
    let base = format!("/api/v1/buildings/{}", record.id);

    let response = router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("{base}/domains"),
            json!({ "domains": ["Heating"] }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("{base}/levels"),
            json!({ "lev": { "H1": 1 } }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(empty_request(Method::POST, &format!("{base}/sri")))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let report = json_body(response).await;
    assert_eq!(report["total_sri"], 4.63);
    assert_eq!(report["sr_domains"]["Heating"], 16.67);

    let response = router
        .clone()
        .oneshot(empty_request(Method::GET, &format!("{base}/sri")))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let stored = json_body(response).await;
    assert_eq!(stored["report"]["total_sri"], 4.63);
    assert_eq!(stored["levels"]["H1"]["1"], 100.0);

    let response = router
        .oneshot(json_request(
            Method::POST,
            &format!("{base}/upgrade"),
            json!({ "targetSri": 10 }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = json_body(response).await;
    assert_eq!(outcome["status"], "found");
    assert_eq!(outcome["new_score"], 17.59);
    assert_eq!(outcome["upgrades"]["H1"]["2"], 100.0);
    assert_eq!(outcome["individual_increases"]["H1"], 12.96);
}

#[tokio::test]
async fn unscored_building_returns_not_found() {
    let (service, _) = build_service();
    let record = heating_building(&service, 1);
    let router = building_router(service);

    let response = router
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/buildings/{}/sri", record.id),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upgrade_target_below_current_is_bad_request() {
    let (service, _) = build_service();
    let record = heating_building(&service, 1);
    let router = building_router(service);

    let response = router
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/buildings/{}/upgrade", record.id),
            json!({ "target_sri": 2.5 }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("must be greater than the current SRI 4.63"));
}

#[tokio::test]
async fn unknown_building_returns_not_found() {
    let (service, _) = build_service();
    let router = building_router(service);

    let response = router
        .oneshot(empty_request(Method::GET, "/api/v1/buildings/99"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_route_returns_registered_buildings() {
    let (service, _) = build_service();
    service.register(office_draft()).expect("registers");
    service.register(office_draft()).expect("registers");
    let router = building_router(service);

    let response = router
        .oneshot(empty_request(Method::GET, "/api/v1/buildings"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}
