use super::common::*;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::workflows::residency::applications::domain::CertificateType;
use crate::workflows::residency::applications::router::{
    self, ReviewRequest, SubmissionRequest,
};
use crate::workflows::residency::applications::{ResidencyApplicationService, ReviewAction};

fn submission_body() -> Value {
    let mut body = serde_json::to_value(adult_payload()).expect("payload serializes");
    body["receipt"] = serde_json::to_value(receipt_for(CertificateType::LocalGovernment))
        .expect("receipt serializes");
    body["submitted_on"] = json!("2024-06-15");
    body
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn submit_route_accepts_a_matching_payload() {
    let (router, repository) = router_with_memory_repository();

    let response = router
        .oneshot(post_json("/api/v1/applications", &submission_body()))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "submitted");
    assert_eq!(body["applicant_name"], "Okafor Ada");

    let stored = repository.records.lock().expect("repository mutex poisoned");
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn submit_route_rejects_a_fee_mismatch() {
    let (router, _) = router_with_memory_repository();

    let mut body = submission_body();
    body["receipt"]["amount"] = json!(4_999);

    let response = router
        .oneshot(post_json("/api/v1/applications", &body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"].as_str().expect("error text").contains("fee"));
}

#[tokio::test]
async fn submit_handler_maps_conflicts_to_409() {
    let service = Arc::new(ResidencyApplicationService::new(Arc::new(
        ConflictRepository,
    )));

    let request = SubmissionRequest {
        payload: adult_payload(),
        receipt: receipt_for(CertificateType::LocalGovernment),
        submitted_on: Some(today()),
    };
    let response =
        router::submit_handler::<ConflictRepository>(State(service), axum::Json(request)).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn submit_handler_maps_unavailability_to_500() {
    let service = Arc::new(ResidencyApplicationService::new(Arc::new(
        UnavailableRepository,
    )));

    let request = SubmissionRequest {
        payload: adult_payload(),
        receipt: receipt_for(CertificateType::LocalGovernment),
        submitted_on: Some(today()),
    };
    let response =
        router::submit_handler::<UnavailableRepository>(State(service), axum::Json(request)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn status_route_returns_the_stored_view() {
    let (service, _) = build_service();
    let record = service
        .submit(
            adult_payload(),
            receipt_for(CertificateType::LocalGovernment),
            today(),
        )
        .expect("submission accepted");
    let router = crate::workflows::residency::applications::application_router(service);

    let uri = format!("/api/v1/applications/{}", record.application_id.0);
    let response = router.oneshot(get(&uri)).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["application_id"], record.application_id.0);
    assert_eq!(body["certificate_type"], "Local Government");
}

#[tokio::test]
async fn status_route_is_not_found_for_unknown_ids() {
    let (router, _) = router_with_memory_repository();

    let response = router
        .oneshot(get("/api/v1/applications/app-999999"))
        .await
        .expect("router responds");

    assert_not_found(&response);
    let body = read_json_body(response).await;
    assert_eq!(body["application_id"], "app-999999");
}

#[tokio::test]
async fn review_route_applies_the_action() {
    let (service, _) = build_service();
    let record = service
        .submit(
            adult_payload(),
            receipt_for(CertificateType::LocalGovernment),
            today(),
        )
        .expect("submission accepted");
    let router = crate::workflows::residency::applications::application_router(service);

    let uri = format!("/api/v1/applications/{}/review", record.application_id.0);
    let response = router
        .oneshot(post_json(&uri, &json!({ "action": "approve" })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "approved");
    assert!(body["certificate_id"]
        .as_str()
        .expect("certificate id")
        .starts_with("LG-UGN-2024-"));
}

#[tokio::test]
async fn review_handler_is_not_found_for_unknown_ids() {
    let (service, _) = build_service();

    let response = router::review_handler::<MemoryRepository>(
        State(service),
        Path("app-999999".to_string()),
        axum::Json(ReviewRequest {
            action: ReviewAction::Approve,
        }),
    )
    .await;

    assert_not_found(&response);
}

#[tokio::test]
async fn report_route_summarizes_the_portfolio() {
    let (service, _) = build_service();
    service
        .submit(
            adult_payload(),
            receipt_for(CertificateType::LocalGovernment),
            today(),
        )
        .expect("submission accepted");
    service
        .submit(
            minor_payload(),
            receipt_for(CertificateType::LocalGovernment),
            today(),
        )
        .expect("submission accepted");
    let router = crate::workflows::residency::applications::application_router(service);

    let response = router
        .oneshot(get("/api/v1/applications/report"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["minor_applications"], 1);
    assert_eq!(body["fees_collected"], 10_000);
}
