//! Application bootstrap: store, schema, reference data and services.
//!
//! # Responsibility
//! - Wire core components from an explicit `CoreConfig`.
//! - Derive per-operation contexts from the configured timeout.

use crate::config::{ConfigError, CoreConfig};
use crate::context::OpContext;
use crate::db::{open_store, open_store_in_memory, DbError, Store};
use crate::seed::{seed_reference_data, SeedError, SeedReport};
use crate::service::item_service::ItemService;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Db(DbError),
    Seed(SeedError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Db(err) => write!(f, "failed to open database: {err}"),
            Self::Seed(err) => write!(f, "failed to seed reference data: {err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Seed(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for AppError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<SeedError> for AppError {
    fn from(value: SeedError) -> Self {
        Self::Seed(value)
    }
}

/// Fully wired core: migrated + seeded store and the services built on it.
#[derive(Debug)]
pub struct App {
    config: CoreConfig,
    store: Store,
    item_service: ItemService,
    seed_report: SeedReport,
}

impl App {
    /// `initialize` with configuration read from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::initialize(CoreConfig::from_env()?)
    }

    /// Opens the configured database file, migrates and seeds it.
    pub fn initialize(config: CoreConfig) -> Result<Self, AppError> {
        let store = open_store(&config.store_config())?;
        Self::with_store(config, store)
    }

    /// Same as `initialize`, on a fresh in-memory database.
    pub fn initialize_in_memory(config: CoreConfig) -> Result<Self, AppError> {
        let store = open_store_in_memory()?;
        Self::with_store(config, store)
    }

    fn with_store(config: CoreConfig, store: Store) -> Result<Self, AppError> {
        let ctx = OpContext::with_timeout(config.default_timeout);
        let seed_report = seed_reference_data(&store, &ctx)?;
        let item_service = ItemService::new(store.clone());

        info!(
            "event=app_init module=app status=ok db_path={} seeded_rows={}",
            config.db_path.display(),
            seed_report.total()
        );
        Ok(Self {
            config,
            store,
            item_service,
            seed_report,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn item_service(&self) -> &ItemService {
        &self.item_service
    }

    /// Rows inserted by the startup seeding run.
    pub fn seed_report(&self) -> SeedReport {
        self.seed_report
    }

    /// Context bounded by the configured default timeout.
    pub fn operation_context(&self) -> OpContext {
        OpContext::with_timeout(self.config.default_timeout)
    }

    pub fn operation_context_with_timeout(&self, timeout: Duration) -> OpContext {
        OpContext::with_timeout(timeout)
    }
}
