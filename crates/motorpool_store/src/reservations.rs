use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;

use crate::schema;

/// Whether the vehicle is currently out or has been returned.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    InProgress,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::InProgress => "in_progress",
            ReservationStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(ReservationStatus::InProgress),
            "completed" => Ok(ReservationStatus::Completed),
            _ => Err(()),
        }
    }
}

impl ToSql<Text, Sqlite> for ReservationStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for ReservationStatus {
    fn from_sql(value: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        s.parse()
            .map_err(|_| format!("unknown reservation status '{s}'").into())
    }
}

/// A single use of the vehicle, from pickup to return.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, serde::Serialize, serde::Deserialize)]
#[diesel(table_name = schema::reservations)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub purpose: String,
    /// Odometer reading when the vehicle left, carried over from the
    /// previous reservation.
    pub odometer_start: i32,
    /// Odometer reading on return; `None` while the vehicle is still out.
    pub odometer_end: Option<i32>,
    pub status: ReservationStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = schema::reservations)]
pub struct NewReservation<'a> {
    pub name: &'a str,
    pub surname: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub purpose: &'a str,
    pub odometer_start: i32,
    pub status: ReservationStatus,
    pub created_at: NaiveDateTime,
}

/// Fields a reservation may change after creation. `None` leaves the
/// column untouched.
#[derive(Debug, Clone, Copy, Default, AsChangeset)]
#[diesel(table_name = schema::reservations)]
pub struct ReservationChangeset {
    pub odometer_end: Option<i32>,
    pub status: Option<ReservationStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [ReservationStatus::InProgress, ReservationStatus::Completed] {
            assert_eq!(status.as_str().parse(), Ok(status));
        }
        assert!("cancelled".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ReservationStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
