use motorpool_service::ReservationService;
use motorpool_store::{LedgerStore, SqliteStore, StoreHandle};
use config::{Environment, File};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] motorpool_store::Error),

    #[error(transparent)]
    Server(#[from] motorpool_server::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

#[derive(serde::Deserialize, Debug)]
pub struct MotorpoolConfig {
    server: motorpool_server::Config,
    store: motorpool_store::Config,
}

impl MotorpoolConfig {
    pub fn new() -> Result<Self, Error> {
        let c = config::Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("motorpool"))
            .build()?;

        Ok(c.try_deserialize()?)
    }
}

/// Facade class encompassing all components that make up the `motorpool`
/// application.
pub struct MotorpoolApp {
    config: MotorpoolConfig,
}

impl MotorpoolApp {
    pub fn new(config: MotorpoolConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<(), Error> {
        let store: StoreHandle = match &self.config.store {
            motorpool_store::Config::Sqlite { url } => {
                let store = SqliteStore::open(url)?;

                if store.has_pending_migrations()? {
                    store.run_pending_migrations()?;
                }

                info!(url = %url, "opened sqlite store");
                Arc::new(store)
            }
            motorpool_store::Config::Ledger { path } => {
                info!(path = %path.display(), "opened ledger store");
                Arc::new(LedgerStore::open(path)?)
            }
        };

        let service = ReservationService::new(store);

        let listener = listenfd::ListenFd::from_env()
            .take_tcp_listener(0)
            .unwrap()
            .unwrap_or_else(|| {
                std::net::TcpListener::bind(format!(
                    "{}:{}",
                    self.config.server.url, self.config.server.port
                ))
                .unwrap()
            });

        Ok(motorpool_server::serve_blocking(listener, service).await?)
    }
}
