//! Unit of work: one store transaction shared by several repositories.
//!
//! # Responsibility
//! - Begin, commit or roll back a single flat transaction around caller work.
//! - Hand out repositories bound to the right handle for the current scope.
//!
//! # Invariants
//! - `run` never invokes `work` when the transaction cannot begin.
//! - A `work` error is returned unchanged after rollback; a rollback failure
//!   on that path is only logged.
//! - Begin honors the context deadline while waiting for the write lock.
//! - Accessors resolve their handle from the scope on every call.
//! - Nested `run` on a transaction-scoped unit fails at begin; one transaction
//!   per business operation is the supported shape.

use crate::context::OpContext;
use crate::db::{run_guarded, Store, StoreError, StoreScope};
use crate::repo::block_repo::SqliteBlockRepository;
use crate::repo::extension_repo::SqliteExtensionRepository;
use crate::repo::item_repo::SqliteItemRepository;
use crate::repo::item_type_repo::SqliteItemTypeRepository;
use crate::repo::language_repo::SqliteLanguageRepository;
use log::{debug, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Transaction lifecycle step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPhase {
    Begin,
    Commit,
}

impl Display for TxPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Begin => write!(f, "begin"),
            Self::Commit => write!(f, "commit"),
        }
    }
}

/// The store failed to open or durably apply a transaction.
#[derive(Debug)]
pub struct TxError {
    pub phase: TxPhase,
    pub source: StoreError,
}

impl TxError {
    pub fn begin(source: StoreError) -> Self {
        Self {
            phase: TxPhase::Begin,
            source,
        }
    }

    pub fn commit(source: StoreError) -> Self {
        Self {
            phase: TxPhase::Commit,
            source,
        }
    }

    pub fn is_begin(&self) -> bool {
        self.phase == TxPhase::Begin
    }

    pub fn is_commit(&self) -> bool {
        self.phase == TxPhase::Commit
    }
}

impl Display for TxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unit of work {} failed: {}", self.phase, self.source)
    }
}

impl Error for TxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Coordinates repositories over the ambient store or one open transaction.
#[derive(Debug, Clone, Copy)]
pub struct UnitOfWork<'h> {
    scope: StoreScope<'h>,
}

impl<'h> UnitOfWork<'h> {
    /// Top-level unit bound to the store; accessors auto-commit per call.
    pub fn new(store: &'h Store) -> Self {
        Self {
            scope: StoreScope::Ambient(store),
        }
    }

    pub fn scope(&self) -> StoreScope<'h> {
        self.scope
    }

    pub fn in_transaction(&self) -> bool {
        self.scope.is_transaction()
    }

    pub fn items(&self) -> SqliteItemRepository<'h> {
        SqliteItemRepository::new(self.scope)
    }

    pub fn extensions(&self) -> SqliteExtensionRepository<'h> {
        SqliteExtensionRepository::new(self.scope)
    }

    pub fn languages(&self) -> SqliteLanguageRepository<'h> {
        SqliteLanguageRepository::new(self.scope)
    }

    pub fn item_types(&self) -> SqliteItemTypeRepository<'h> {
        SqliteItemTypeRepository::new(self.scope)
    }

    pub fn blocks(&self) -> SqliteBlockRepository<'h> {
        SqliteBlockRepository::new(self.scope)
    }

    /// Runs `work` inside a freshly begun transaction.
    ///
    /// Commits when `work` returns `Ok`, rolls back otherwise. Begin and
    /// commit failures are converted into `E` through `From<TxError>`.
    pub fn run<T, E, F>(&self, ctx: &OpContext, work: F) -> Result<T, E>
    where
        F: FnOnce(&UnitOfWork<'_>) -> Result<T, E>,
        E: From<TxError>,
    {
        let started_at = Instant::now();
        let pooled;
        let conn: &Connection = match self.scope {
            StoreScope::Ambient(store) => match store.checkout(ctx) {
                Ok(conn) => {
                    pooled = conn;
                    &*pooled
                }
                Err(err) => return Err(begin_failed(err, started_at).into()),
            },
            StoreScope::Transaction(conn) => conn,
        };

        let tx = match begin(conn, ctx) {
            Ok(tx) => tx,
            Err(err) => return Err(begin_failed(err, started_at).into()),
        };
        debug!("event=tx_begin module=uow status=ok");

        let scoped = UnitOfWork {
            scope: StoreScope::Transaction(&tx),
        };
        match work(&scoped) {
            Ok(value) => match tx.commit() {
                Ok(()) => {
                    debug!(
                        "event=tx_commit module=uow status=ok duration_ms={}",
                        started_at.elapsed().as_millis()
                    );
                    Ok(value)
                }
                Err(err) => {
                    warn!(
                        "event=tx_commit module=uow status=error duration_ms={} error={}",
                        started_at.elapsed().as_millis(),
                        err
                    );
                    Err(TxError::commit(StoreError::Sqlite(err)).into())
                }
            },
            Err(work_err) => {
                match tx.rollback() {
                    Ok(()) => debug!(
                        "event=tx_rollback module=uow status=ok duration_ms={}",
                        started_at.elapsed().as_millis()
                    ),
                    Err(err) => warn!(
                        "event=tx_rollback module=uow status=error duration_ms={} error={}",
                        started_at.elapsed().as_millis(),
                        err
                    ),
                }
                Err(work_err)
            }
        }
    }
}

/// `BEGIN IMMEDIATE` under `ctx`; waiting on another writer's lock ends at the deadline.
fn begin<'c>(conn: &'c Connection, ctx: &OpContext) -> Result<Transaction<'c>, StoreError> {
    run_guarded(conn, ctx, |_| {
        Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
    })
}

fn begin_failed(err: StoreError, started_at: Instant) -> TxError {
    warn!(
        "event=tx_begin module=uow status=error duration_ms={} error={}",
        started_at.elapsed().as_millis(),
        err
    );
    TxError::begin(err)
}
