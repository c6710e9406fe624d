//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define one typed contract per catalog entity.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - A repository is bound to a `StoreScope` at construction and never
//!   outlives it.
//! - Natural-key lookups return `NotFound` as a distinct kind, never a
//!   generic failure.
//! - Soft-deleted rows are invisible to lookups.

pub mod block_repo;
pub mod error;
pub mod extension_repo;
pub mod item_repo;
pub mod item_type_repo;
pub mod language_repo;
pub mod unit_of_work;

pub use error::{Lookup, RepoError, RepoErrorKind, RepoOp, RepoResult};
pub use unit_of_work::{TxError, TxPhase, UnitOfWork};

use crate::context::OpContext;
use crate::db::{StoreError, StoreScope};
use log::debug;
use rusqlite::{OptionalExtension, Params, Row};
use std::time::Instant;

/// Runs a single-row query and classifies the outcome.
pub(crate) fn find_one<T, P>(
    scope: &StoreScope<'_>,
    ctx: &OpContext,
    sql: &str,
    params: P,
    map_row: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Lookup<T>
where
    P: Params,
{
    let outcome = scope.with_connection(ctx, |conn| {
        conn.query_row(sql, params, map_row).optional()
    });
    Lookup::from_query(outcome)
}

/// Emits the per-call `repo_query` debug event.
pub(crate) fn log_query<T>(
    op: RepoOp,
    entity: &'static str,
    key: &str,
    started_at: Instant,
    outcome: &Result<T, RepoError>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match outcome {
        Ok(_) => debug!(
            "event=repo_query module=repo entity={} op={} key={} status=ok duration_ms={}",
            entity, op, key, duration_ms
        ),
        Err(err) => debug!(
            "event=repo_query module=repo entity={} op={} key={} status=error duration_ms={} error={}",
            entity, op, key, duration_ms, err.kind
        ),
    }
}

/// Wraps a store failure with repository context.
pub(crate) fn store_failure(
    op: RepoOp,
    entity: &'static str,
    key: impl Into<String>,
    source: StoreError,
) -> RepoError {
    RepoError::new(op, entity, key, RepoErrorKind::Store(source))
}
