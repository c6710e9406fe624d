//! SQLite storage bootstrap, pooled store handle and schema migrations.
//!
//! # Responsibility
//! - Open and configure pooled SQLite connections for pkmc core.
//! - Apply schema migrations in deterministic order.
//! - Run individual store calls under an `OpContext`.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write catalog data before migrations succeed.
//! - Every pooled connection has `foreign_keys=ON`.

use crate::context::ContextError;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod guard;
pub mod migrations;
mod open;
mod scope;

pub use open::{open_store, open_store_in_memory, StoreConfig};
pub use scope::StoreScope;

pub(crate) use guard::run_guarded;

pub type DbResult<T> = Result<T, DbError>;

/// Connection pool shared by every operation.
pub type ConnectionPool = r2d2::Pool<SqliteConnectionManager>;

/// Connection checked out of the pool for the duration of one call or transaction.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Errors raised while opening or migrating a store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Pool(r2d2::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Pool(err) => write!(f, "connection pool error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Pool(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<r2d2::Error> for DbError {
    fn from(value: r2d2::Error) -> Self {
        Self::Pool(value)
    }
}

/// A single store call failed.
#[derive(Debug)]
pub enum StoreError {
    /// The operation context expired or was canceled before/while the call ran.
    Context(ContextError),
    Sqlite(rusqlite::Error),
    /// No pooled connection became available in time.
    Pool(r2d2::Error),
}

impl StoreError {
    /// Uniqueness, foreign-key, `CHECK` or `NOT NULL` rule rejected a write.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == ErrorCode::ConstraintViolation
            }
            _ => false,
        }
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::Context(ContextError::DeadlineExceeded))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Context(ContextError::Canceled))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Context(err) => write!(f, "{err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Pool(err) => write!(f, "connection pool error: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Context(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::Pool(err) => Some(err),
        }
    }
}

impl From<ContextError> for StoreError {
    fn from(value: ContextError) -> Self {
        Self::Context(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(value: r2d2::Error) -> Self {
        Self::Pool(value)
    }
}

/// Concurrency-safe handle to the catalog database.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Clone)]
pub struct Store {
    pool: ConnectionPool,
    in_memory: bool,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("in_memory", &self.in_memory)
            .field("state", &self.pool.state())
            .finish()
    }
}

impl Store {
    pub(crate) fn new(pool: ConnectionPool, in_memory: bool) -> Self {
        Self { pool, in_memory }
    }

    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// Checks out a connection, waiting no longer than the context allows.
    pub fn checkout(
        &self,
        ctx: &crate::context::OpContext,
    ) -> Result<PooledConnection, StoreError> {
        ctx.check()?;
        let connection = match ctx.remaining() {
            Some(remaining) => self.pool.get_timeout(remaining),
            None => self.pool.get(),
        };
        match connection {
            Ok(conn) => Ok(conn),
            Err(err) => match ctx.check() {
                Err(ctx_err) => Err(StoreError::Context(ctx_err)),
                Ok(()) => Err(StoreError::Pool(err)),
            },
        }
    }

    /// Top-level scope bound to this store (no transaction).
    pub fn scope(&self) -> StoreScope<'_> {
        StoreScope::Ambient(self)
    }
}
