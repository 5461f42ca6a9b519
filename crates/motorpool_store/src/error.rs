use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("diesel error: {0}")]
    Diesel(#[from] diesel::result::Error),

    #[error("pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("migration error: {0}")]
    Migration(&'static str),

    #[error("ledger i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed ledger row: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("no reservation with id {0}")]
    NotFound(i32),
}
