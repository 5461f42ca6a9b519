use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use motorpool_service::{ReservationError, ReservationRequest};
use motorpool_store::ReservationStatus;
use serde_json::json;

use crate::api::ApiError;
use crate::AppState;

#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CompleteRequest {
    odometer_end: i32,
}

#[derive(serde::Deserialize, Debug, Default)]
struct ListParams {
    status: Option<ReservationStatus>,
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<ReservationRequest>,
) -> Result<Response, ApiError> {
    let record = state.service.create(body)?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

async fn complete(
    State(state): State<AppState>,
    Json(body): Json<CompleteRequest>,
) -> Result<Response, ApiError> {
    let record = state.service.complete(body.odometer_end)?;
    Ok(Json(record).into_response())
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    Ok(Json(state.service.list(params.status)?).into_response())
}

async fn current(State(state): State<AppState>) -> Result<Response, ApiError> {
    let record = state
        .service
        .current()?
        .ok_or(ReservationError::NoneInProgress)?;
    Ok(Json(record).into_response())
}

pub(crate) async fn odometer(State(state): State<AppState>) -> Result<Response, ApiError> {
    let odometer_start = state.service.starting_odometer()?;
    Ok(Json(json!({ "odometerStart": odometer_start })).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/complete", post(complete))
        .route("/current", get(current))
}
