//! Booking rules for the shared vehicle.
//!
//! [`ReservationService`] sits between the presentation layer and the
//! store. It decides whether a requested window can be booked, carries the
//! odometer reading from one reservation to the next, and closes out the
//! reservation currently in progress. It holds no state of its own beyond
//! a handle to the store.

pub mod reservation;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

pub use reservation::{ReservationRequest, ReservationService};

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("name and surname are required")]
    MissingRequester,

    #[error("end date {end} is earlier than start date {start}")]
    DateOrder { start: NaiveDate, end: NaiveDate },

    #[error("end time must be later than start time for a same-day reservation")]
    TimeOrder,

    #[error("vehicle already reserved from {start} to {end} (reservation #{id})")]
    Conflict {
        id: i32,
        start: NaiveTime,
        end: NaiveTime,
    },

    #[error("odometer reading {provided} must be greater than {current}")]
    OdometerNotIncreased { provided: i32, current: i32 },

    #[error("no reservation in progress")]
    NoneInProgress,

    #[error(transparent)]
    Store(#[from] motorpool_store::Error),
}
