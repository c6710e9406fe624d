//! Store bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Build file or in-memory connection pools.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable store.
//!
//! # Invariants
//! - Every pooled connection has `foreign_keys=ON` and a busy timeout.
//! - Returned stores have migrations fully applied.
//! - The in-memory pool holds exactly one connection that is never recycled.

use super::migrations::apply_migrations;
use super::{ConnectionPool, DbResult, Store};
use log::{error, info};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for a file-backed store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
    /// Upper bound on concurrently open connections.
    pub pool_size: u32,
    /// How long a writer waits on a locked database.
    pub busy_timeout: Duration,
    /// Pool checkout wait when the operation context has no deadline.
    pub checkout_timeout: Duration,
}

impl StoreConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pool_size: DEFAULT_POOL_SIZE,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }
}

/// Opens a pooled SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_store(config: &StoreConfig) -> DbResult<Store> {
    let started_at = Instant::now();
    info!(
        "event=db_open module=db status=start mode=file pool_size={}",
        config.pool_size
    );

    let busy_timeout = config.busy_timeout;
    let manager = SqliteConnectionManager::file(&config.path).with_init(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")
    });
    let pool = r2d2::Pool::builder()
        .max_size(config.pool_size.max(1))
        .connection_timeout(config.checkout_timeout)
        .build(manager);

    finish_open(pool, false, "file", started_at)
}

/// Opens an in-memory SQLite store and applies all pending migrations.
///
/// The pool holds a single connection, so concurrent callers queue on it.
pub fn open_store_in_memory() -> DbResult<Store> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let manager = SqliteConnectionManager::memory().with_init(|conn| {
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    });
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .min_idle(Some(1))
        .idle_timeout(None)
        .max_lifetime(None)
        .connection_timeout(DEFAULT_CHECKOUT_TIMEOUT)
        .build(manager);

    finish_open(pool, true, "memory", started_at)
}

fn finish_open(
    pool: Result<ConnectionPool, r2d2::Error>,
    in_memory: bool,
    mode: &str,
    started_at: Instant,
) -> DbResult<Store> {
    let pool = match pool {
        Ok(pool) => pool,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match migrate_pool(&pool) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(Store::new(pool, in_memory))
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn migrate_pool(pool: &ConnectionPool) -> DbResult<()> {
    let mut conn = pool.get()?;
    apply_migrations(&mut conn)
}
