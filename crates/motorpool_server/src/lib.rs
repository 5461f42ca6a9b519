//! motorpool-server
//!
//! HTTP surface of the motorpool application. Every route is a thin
//! wrapper over [`motorpool_service::ReservationService`]: handlers
//! deserialize the request, call the service, and translate the outcome
//! into a status code and JSON body. Booking rules live in the service,
//! never here.

pub(crate) mod api;
pub mod app;
pub mod error;
pub(crate) mod reservations;

pub use app::{serve_blocking, AppState};
pub use error::Error;

#[derive(serde::Deserialize, Debug)]
pub struct Config {
    pub url: String,
    pub port: u16,
}
