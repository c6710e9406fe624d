//! Core catalog logic for pkmc.
//! Reference data, items and the transactional boundary between them live here.

pub mod app;
pub mod config;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use app::{App, AppError};
pub use config::{ConfigError, CoreConfig};
pub use context::{ContextError, OpContext};
pub use db::{open_store, open_store_in_memory, DbError, Store, StoreConfig, StoreError, StoreScope};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::block::Block;
pub use model::extension::Extension;
pub use model::item::Item;
pub use model::item_type::ItemType;
pub use model::language::Language;
pub use model::price::{InvalidPrice, Price};
pub use model::record::{RecordId, Timestamps};
pub use repo::block_repo::{BlockRepository, SqliteBlockRepository};
pub use repo::extension_repo::{ExtensionRepository, SqliteExtensionRepository};
pub use repo::item_repo::{ItemRepository, SqliteItemRepository};
pub use repo::item_type_repo::{ItemTypeRepository, SqliteItemTypeRepository};
pub use repo::language_repo::{LanguageRepository, SqliteLanguageRepository};
pub use repo::{Lookup, RepoError, RepoErrorKind, RepoOp, RepoResult, TxError, TxPhase, UnitOfWork};
pub use seed::{seed_reference_data, SeedError, SeedReport};
pub use service::item_service::{CreateItemRequest, ItemField, ItemService, ItemServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
