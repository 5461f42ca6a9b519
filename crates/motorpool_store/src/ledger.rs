//! Tabular file backend: one JSON row per reservation, append-ordered.
//!
//! The whole file is small enough to load per call, so every operation
//! reads it, works on the rows in memory, and rewrites it through a
//! temporary file swapped in by rename. A failed call leaves the file as
//! it was.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::reservations::{NewReservation, Reservation, ReservationChangeset};
use crate::{Error, ReservationStatus, ReservationStore};

pub struct LedgerStore {
    path: PathBuf,
    // Single-writer contract: calls never interleave on the file.
    lock: Mutex<()>,
}

impl LedgerStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        if !path.exists() {
            fs::File::create(&path)?;
        }

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    fn load(&self) -> Result<Vec<Reservation>, Error> {
        let raw = fs::read_to_string(&self.path)?;
        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(Error::from))
            .collect()
    }

    fn persist(&self, rows: &[Reservation]) -> Result<(), Error> {
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            for row in rows {
                serde_json::to_writer(&mut file, row)?;
                file.write_all(b"\n")?;
            }
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ReservationStore for LedgerStore {
    fn insert(&self, new: NewReservation<'_>) -> Result<Reservation, Error> {
        let _guard = self.guard();
        let mut rows = self.load()?;

        let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let record = Reservation {
            id,
            name: new.name.to_owned(),
            surname: new.surname.to_owned(),
            start_date: new.start_date,
            end_date: new.end_date,
            start_time: new.start_time,
            end_time: new.end_time,
            purpose: new.purpose.to_owned(),
            odometer_start: new.odometer_start,
            odometer_end: None,
            status: new.status,
            created_at: new.created_at,
        };

        rows.push(record.clone());
        self.persist(&rows)?;

        Ok(record)
    }

    fn update(&self, id: i32, changes: ReservationChangeset) -> Result<Reservation, Error> {
        let _guard = self.guard();
        let mut rows = self.load()?;

        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(Error::NotFound(id))?;
        if let Some(odometer_end) = changes.odometer_end {
            row.odometer_end = Some(odometer_end);
        }
        if let Some(status) = changes.status {
            row.status = status;
        }
        let updated = row.clone();

        self.persist(&rows)?;

        Ok(updated)
    }

    fn by_status(&self, status: ReservationStatus) -> Result<Vec<Reservation>, Error> {
        let _guard = self.guard();
        let mut rows = self.load()?;

        rows.retain(|r| r.status == status);
        rows.sort_by_key(|r| (r.created_at, r.id));

        Ok(rows)
    }

    fn last_by_creation(&self) -> Result<Option<Reservation>, Error> {
        let _guard = self.guard();
        let rows = self.load()?;

        Ok(rows
            .into_iter()
            .max_by_key(|r| (r.created_at, r.id)))
    }
}
