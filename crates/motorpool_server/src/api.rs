use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use motorpool_service::ReservationError;
use serde_json::json;
use thiserror::Error;

trait AsStatusCode {
    fn as_status_code(&self) -> StatusCode;
}

impl AsStatusCode for ReservationError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            ReservationError::MissingRequester
            | ReservationError::DateOrder { .. }
            | ReservationError::TimeOrder
            | ReservationError::OdometerNotIncreased { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ReservationError::Conflict { .. } => StatusCode::CONFLICT,
            ReservationError::NoneInProgress => StatusCode::NOT_FOUND,
            ReservationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("reservation error: {0}")]
    Reservation(#[from] ReservationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, msg) = match self {
            ApiError::Reservation(e) => (e.as_status_code(), e.to_string()),
        };
        let body = Json(json!({
            "error": {
                "detail": msg,
            }
        }));

        (status_code, body).into_response()
    }
}

pub fn router() -> Router<crate::AppState> {
    let router_v1 = Router::new()
        .nest("/reservations", crate::reservations::router())
        .route("/odometer", get(crate::reservations::odometer));

    Router::new().nest("/v1", router_v1)
}
