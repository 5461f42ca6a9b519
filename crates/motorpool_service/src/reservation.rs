use chrono::{NaiveDate, NaiveTime, Utc};
use motorpool_store::{
    NewReservation, Reservation, ReservationChangeset, ReservationStatus, StoreHandle,
};
use tracing::info;

use crate::ReservationError;

/// A requested booking window, as entered in the reservation form.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub name: String,
    pub surname: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub purpose: String,
}

#[derive(Clone)]
pub struct ReservationService {
    store: StoreHandle,
}

impl ReservationService {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Books the requested window, or says why it cannot be booked.
    ///
    /// Checks run in order: requester present, dates ordered, same-day
    /// times ordered, no clash with a reservation already in progress.
    /// Nothing is persisted unless every check passes.
    pub fn create(&self, request: ReservationRequest) -> Result<Reservation, ReservationError> {
        let name = request.name.trim();
        let surname = request.surname.trim();
        if name.is_empty() || surname.is_empty() {
            return Err(ReservationError::MissingRequester);
        }
        if request.end_date < request.start_date {
            return Err(ReservationError::DateOrder {
                start: request.start_date,
                end: request.end_date,
            });
        }
        if request.start_date == request.end_date && request.end_time <= request.start_time {
            return Err(ReservationError::TimeOrder);
        }

        for existing in self.store.by_status(ReservationStatus::InProgress)? {
            if overlaps(&existing, &request) {
                return Err(ReservationError::Conflict {
                    id: existing.id,
                    start: existing.start_time,
                    end: existing.end_time,
                });
            }
        }

        let odometer_start = self.starting_odometer()?;
        let record = self.store.insert(NewReservation {
            name,
            surname,
            start_date: request.start_date,
            end_date: request.end_date,
            start_time: request.start_time,
            end_time: request.end_time,
            purpose: request.purpose.trim(),
            odometer_start,
            status: ReservationStatus::InProgress,
            created_at: Utc::now().naive_utc(),
        })?;

        info!(id = record.id, odometer_start, "reservation opened");

        Ok(record)
    }

    /// Records the return of the vehicle on the most recently created
    /// reservation still in progress.
    pub fn complete(&self, odometer_end: i32) -> Result<Reservation, ReservationError> {
        let target = self.current()?.ok_or(ReservationError::NoneInProgress)?;

        if odometer_end <= target.odometer_start {
            return Err(ReservationError::OdometerNotIncreased {
                provided: odometer_end,
                current: target.odometer_start,
            });
        }

        let record = self.store.update(
            target.id,
            ReservationChangeset {
                odometer_end: Some(odometer_end),
                status: Some(ReservationStatus::Completed),
            },
        )?;

        info!(id = record.id, odometer_end, "reservation completed");

        Ok(record)
    }

    /// The reservation [`complete`](Self::complete) would act on, if any.
    pub fn current(&self) -> Result<Option<Reservation>, ReservationError> {
        let mut open = self.store.by_status(ReservationStatus::InProgress)?;
        open.sort_by_key(|r| (r.created_at, r.id));
        Ok(open.pop())
    }

    /// The odometer value the next reservation will start at.
    ///
    /// Continuation of the latest record: its ending reading once the
    /// vehicle came back, its starting reading while it is still out, and
    /// 0 when no reservation was ever taken.
    pub fn starting_odometer(&self) -> Result<i32, ReservationError> {
        Ok(self
            .store
            .last_by_creation()?
            .map(|r| r.odometer_end.unwrap_or(r.odometer_start))
            .unwrap_or(0))
    }

    pub fn list(
        &self,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, ReservationError> {
        let mut rows = match status {
            Some(status) => self.store.by_status(status)?,
            None => {
                let mut rows = self.store.by_status(ReservationStatus::InProgress)?;
                rows.extend(self.store.by_status(ReservationStatus::Completed)?);
                rows
            }
        };
        rows.sort_by_key(|r| (r.created_at, r.id));
        Ok(rows)
    }
}

/// Two windows clash when they share a start date and their time intervals
/// intersect. Touching endpoints (one window ending exactly when the other
/// begins) do not clash. Windows are compared by start date only, so a
/// multi-day reservation is not held against later dates it spans.
fn overlaps(existing: &Reservation, request: &ReservationRequest) -> bool {
    existing.start_date == request.start_date
        && existing.start_time < request.end_time
        && existing.end_time > request.start_time
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use motorpool_store::{LedgerStore, SqliteStore};

    use super::*;
    use crate::ReservationError;

    fn sqlite_service() -> ReservationService {
        ReservationService::new(Arc::new(SqliteStore::open_in_memory().unwrap()))
    }

    fn request(start: &str, end: &str) -> ReservationRequest {
        window("2024-01-01", "2024-01-01", start, end)
    }

    fn window(start_date: &str, end_date: &str, start: &str, end: &str) -> ReservationRequest {
        ReservationRequest {
            name: "Dupont".into(),
            surname: "Jean".into(),
            start_date: start_date.parse().unwrap(),
            end_date: end_date.parse().unwrap(),
            start_time: format!("{start}:00").parse().unwrap(),
            end_time: format!("{end}:00").parse().unwrap(),
            purpose: "trip".into(),
        }
    }

    #[test]
    fn test_create_on_empty_store_starts_at_zero() {
        let service = sqlite_service();

        let record = service.create(request("09:00", "10:00")).unwrap();

        assert_eq!(record.odometer_start, 0);
        assert_eq!(record.odometer_end, None);
        assert_eq!(record.status, ReservationStatus::InProgress);
        assert_eq!(record.name, "Dupont");
        assert_eq!(record.surname, "Jean");
    }

    #[test]
    fn test_blank_requester_is_rejected() {
        let service = sqlite_service();

        let mut req = request("09:00", "10:00");
        req.surname = "   ".into();

        assert!(matches!(
            service.create(req).unwrap_err(),
            ReservationError::MissingRequester
        ));
        assert!(service.current().unwrap().is_none());
    }

    #[test]
    fn test_end_date_before_start_date_is_rejected() {
        let service = sqlite_service();

        let req = window("2024-01-02", "2024-01-01", "09:00", "10:00");

        assert!(matches!(
            service.create(req).unwrap_err(),
            ReservationError::DateOrder { .. }
        ));
    }

    #[test]
    fn test_same_day_times_must_be_ordered() {
        let service = sqlite_service();

        assert!(matches!(
            service.create(request("10:00", "10:00")).unwrap_err(),
            ReservationError::TimeOrder
        ));
        assert!(matches!(
            service.create(request("10:00", "09:00")).unwrap_err(),
            ReservationError::TimeOrder
        ));
    }

    #[test]
    fn test_multi_day_window_may_end_earlier_in_the_day() {
        let service = sqlite_service();

        // Ends the next day at an earlier hour; only same-day windows need
        // ordered times.
        let req = window("2024-01-01", "2024-01-02", "18:00", "08:00");

        assert!(service.create(req).is_ok());
    }

    #[test]
    fn test_contained_window_conflicts() {
        let service = sqlite_service();
        let first = service.create(request("09:00", "10:00")).unwrap();

        let err = service.create(request("09:30", "09:45")).unwrap_err();

        match err {
            ReservationError::Conflict { id, .. } => assert_eq!(id, first.id),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_overlap_conflicts() {
        let service = sqlite_service();
        service.create(request("09:00", "10:00")).unwrap();

        assert!(matches!(
            service.create(request("09:30", "11:00")).unwrap_err(),
            ReservationError::Conflict { .. }
        ));
        assert!(matches!(
            service.create(request("08:00", "09:30")).unwrap_err(),
            ReservationError::Conflict { .. }
        ));
        // A window swallowing the existing one whole.
        assert!(matches!(
            service.create(request("08:00", "11:00")).unwrap_err(),
            ReservationError::Conflict { .. }
        ));
    }

    #[test]
    fn test_touching_windows_do_not_conflict() {
        let service = sqlite_service();
        service.create(request("09:00", "10:00")).unwrap();

        assert!(service.create(request("10:00", "11:00")).is_ok());
        assert!(service.create(request("08:00", "09:00")).is_ok());
    }

    #[test]
    fn test_windows_on_different_start_dates_do_not_conflict() {
        let service = sqlite_service();
        service
            .create(window("2024-01-01", "2024-01-02", "09:00", "10:00"))
            .unwrap();

        // Compared by start date only; the multi-day window above does not
        // block the second day.
        assert!(service
            .create(window("2024-01-02", "2024-01-02", "09:00", "10:00"))
            .is_ok());
    }

    #[test]
    fn test_completed_window_no_longer_blocks() {
        let service = sqlite_service();
        service.create(request("09:00", "10:00")).unwrap();
        service.complete(50).unwrap();

        assert!(service.create(request("09:00", "10:00")).is_ok());
    }

    #[test]
    fn test_complete_records_return() {
        let service = sqlite_service();
        service.create(request("09:00", "10:00")).unwrap();

        let record = service.complete(150).unwrap();

        assert_eq!(record.odometer_end, Some(150));
        assert_eq!(record.status, ReservationStatus::Completed);
    }

    #[test]
    fn test_complete_requires_higher_odometer() {
        let service = sqlite_service();
        service.create(request("09:00", "10:00")).unwrap();
        service.complete(150).unwrap();
        service.create(request("10:00", "11:00")).unwrap();

        let err = service.complete(90).unwrap_err();

        assert!(matches!(
            err,
            ReservationError::OdometerNotIncreased {
                provided: 90,
                current: 150,
            }
        ));
    }

    #[test]
    fn test_complete_without_open_reservation_is_none_in_progress() {
        let service = sqlite_service();

        assert!(matches!(
            service.complete(10).unwrap_err(),
            ReservationError::NoneInProgress
        ));

        // Completing twice behaves the same: the second call finds nothing.
        service.create(request("09:00", "10:00")).unwrap();
        service.complete(10).unwrap();
        assert!(matches!(
            service.complete(20).unwrap_err(),
            ReservationError::NoneInProgress
        ));
    }

    #[test]
    fn test_complete_targets_most_recent_open_reservation() {
        let service = sqlite_service();
        service.create(request("09:00", "10:00")).unwrap();
        let second = service.create(request("10:00", "11:00")).unwrap();

        let completed = service.complete(30).unwrap();

        assert_eq!(completed.id, second.id);
    }

    #[test]
    fn test_odometer_carries_over_and_never_decreases() {
        let service = sqlite_service();

        let first = service.create(request("09:00", "10:00")).unwrap();
        assert_eq!(first.odometer_start, 0);
        service.complete(120).unwrap();

        let second = service.create(request("10:00", "11:00")).unwrap();
        assert_eq!(second.odometer_start, 120);

        // A third reservation opened while the second is still out starts
        // from the second's starting reading.
        let third = service.create(request("12:00", "13:00")).unwrap();
        assert_eq!(third.odometer_start, 120);
        assert!(third.odometer_start >= second.odometer_start);
    }

    #[test]
    fn test_starting_odometer_prefill() {
        let service = sqlite_service();
        assert_eq!(service.starting_odometer().unwrap(), 0);

        service.create(request("09:00", "10:00")).unwrap();
        service.complete(75).unwrap();

        assert_eq!(service.starting_odometer().unwrap(), 75);
    }

    #[test]
    fn test_list_filters_by_status() {
        let service = sqlite_service();
        service.create(request("09:00", "10:00")).unwrap();
        service.complete(10).unwrap();
        service.create(request("10:00", "11:00")).unwrap();

        assert_eq!(service.list(None).unwrap().len(), 2);
        assert_eq!(
            service
                .list(Some(ReservationStatus::Completed))
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            service
                .list(Some(ReservationStatus::InProgress))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_ledger_backend_behaves_the_same() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("reservations.ndjson")).unwrap();
        let service = ReservationService::new(Arc::new(store));

        let first = service.create(request("09:00", "10:00")).unwrap();
        assert_eq!(first.odometer_start, 0);

        assert!(matches!(
            service.create(request("09:30", "09:45")).unwrap_err(),
            ReservationError::Conflict { .. }
        ));

        service.complete(150).unwrap();
        let second = service.create(request("09:30", "09:45")).unwrap();
        assert_eq!(second.odometer_start, 150);
    }
}
