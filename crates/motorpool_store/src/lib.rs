//! Persistence for vehicle reservations.
//!
//! The [`ReservationStore`] trait is the only surface the rest of the
//! workspace sees. Two backends implement it: [`SqliteStore`], a pooled
//! SQLite database, and [`ledger::LedgerStore`], a tabular file with one
//! JSON row per reservation. Which one runs is a configuration choice;
//! callers cannot tell them apart.

pub mod error;
pub mod ledger;
pub mod reservations;
pub mod schema;

use std::borrow::BorrowMut;
use std::path::PathBuf;
use std::sync::Arc;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub use error::Error;
pub use ledger::LedgerStore;
pub use reservations::{
    NewReservation, Reservation, ReservationChangeset, ReservationStatus,
};

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum Config {
    Sqlite { url: String },
    Ledger { path: PathBuf },
}

/// Record-level access to the reservation table, regardless of backend.
pub trait ReservationStore: Send + Sync {
    /// Appends a new record and assigns it the next identifier.
    fn insert(&self, new: NewReservation<'_>) -> Result<Reservation, Error>;

    /// Updates fields of an existing record in place.
    fn update(&self, id: i32, changes: ReservationChangeset) -> Result<Reservation, Error>;

    fn by_status(&self, status: ReservationStatus) -> Result<Vec<Reservation>, Error>;

    /// The most recently created record, id as tie-break.
    fn last_by_creation(&self) -> Result<Option<Reservation>, Error>;
}

pub type StoreHandle = Arc<dyn ReservationStore>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
type ConnectionType = SqliteConnection;
type ConnectionPool = Pool<ConnectionManager<ConnectionType>>;

#[derive(Clone)]
pub struct SqliteStore {
    pool: ConnectionPool,
}

impl SqliteStore {
    pub fn open<S: Into<String>>(store_url: S) -> Result<Self, Error> {
        let manager = ConnectionManager::<ConnectionType>::new(store_url);

        Ok(Self {
            pool: Pool::builder().build(manager)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        let manager = ConnectionManager::<ConnectionType>::new(":memory:");

        // An in-memory database lives only as long as its connection, so the
        // pool must hand out that one connection every time.
        let pool = Pool::builder().max_size(1).build(manager)?;
        let store = Self { pool };
        store.run_pending_migrations()?;

        Ok(store)
    }

    pub fn has_pending_migrations(&self) -> Result<bool, Error> {
        self.pool
            .get()?
            .borrow_mut()
            .has_pending_migration(MIGRATIONS)
            .map_err(|_| crate::Error::Migration("failed to check pending migrations"))
    }

    pub fn run_pending_migrations(&self) -> Result<(), Error> {
        self.pool
            .get()?
            .borrow_mut()
            .run_pending_migrations(MIGRATIONS)
            .map_err(|_| crate::Error::Migration("failed to run pending migrations"))?;
        Ok(())
    }
}

impl ReservationStore for SqliteStore {
    fn insert(&self, new: NewReservation<'_>) -> Result<Reservation, Error> {
        let mut conn = self.pool.get()?;

        Ok(diesel::insert_into(schema::reservations::table)
            .values(&new)
            .returning(Reservation::as_returning())
            .get_result(conn.borrow_mut())?)
    }

    fn update(&self, id: i32, changes: ReservationChangeset) -> Result<Reservation, Error> {
        let mut conn = self.pool.get()?;

        diesel::update(schema::reservations::table.find(id))
            .set(&changes)
            .returning(Reservation::as_returning())
            .get_result(conn.borrow_mut())
            .optional()?
            .ok_or(Error::NotFound(id))
    }

    fn by_status(&self, status: ReservationStatus) -> Result<Vec<Reservation>, Error> {
        let mut conn = self.pool.get()?;

        Ok(schema::reservations::table
            .filter(schema::reservations::status.eq(status))
            .order((
                schema::reservations::created_at.asc(),
                schema::reservations::id.asc(),
            ))
            .select(Reservation::as_select())
            .load(conn.borrow_mut())?)
    }

    fn last_by_creation(&self) -> Result<Option<Reservation>, Error> {
        let mut conn = self.pool.get()?;

        Ok(schema::reservations::table
            .order((
                schema::reservations::created_at.desc(),
                schema::reservations::id.desc(),
            ))
            .select(Reservation::as_select())
            .first(conn.borrow_mut())
            .optional()?)
    }
}
