use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, ApplicationPayload};
use super::payment::PaymentReceipt;
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{ApplicationServiceError, ResidencyApplicationService, ReviewAction};

#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    #[serde(flatten)]
    pub payload: ApplicationPayload,
    pub receipt: PaymentReceipt,
    #[serde(default)]
    pub submitted_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub action: ReviewAction,
}

/// Router builder exposing HTTP endpoints for intake, status, and review.
pub fn application_router<R>(service: Arc<ResidencyApplicationService<R>>) -> Router
where
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<R>))
        .route("/api/v1/applications/:application_id", get(status_handler::<R>))
        .route(
            "/api/v1/applications/:application_id/review",
            post(review_handler::<R>),
        )
        .route("/api/v1/applications/report", get(report_handler::<R>))
        .with_state(service)
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<ResidencyApplicationService<R>>>,
    axum::Json(request): axum::Json<SubmissionRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let submitted_on = request
        .submitted_on
        .unwrap_or_else(|| Local::now().date_naive());

    match service.submit(request.payload, request.receipt, submitted_on) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::ACCEPTED, axum::Json(view)).into_response()
        }
        Err(error @ ApplicationServiceError::FeeMismatch { .. }) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(ApplicationServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({ "error": "application already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<ResidencyApplicationService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(ApplicationServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({ "error": "application not found", "application_id": id.0 });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn review_handler<R>(
    State(service): State<Arc<ResidencyApplicationService<R>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ReviewRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.review(&id, request.action) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(ApplicationServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({ "error": "application not found", "application_id": id.0 });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn report_handler<R>(
    State(service): State<Arc<ResidencyApplicationService<R>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.report() {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
