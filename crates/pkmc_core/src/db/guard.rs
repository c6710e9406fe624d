//! Context-aware execution of single store calls.
//!
//! # Invariants
//! - A done context never reaches SQLite.
//! - A statement running when the context expires is interrupted through the
//!   SQLite progress handler, and reported as the context error.
//! - Lock waits never outlast the context: the busy timeout is capped at the
//!   remaining time for the duration of the call, and a busy failure under a
//!   capped wait is reported as the context error.
//! - The progress handler and busy timeout are restored before returning, so
//!   pooled connections never carry per-call settings.

use super::StoreError;
use crate::context::{ContextError, OpContext};
use log::warn;
use rusqlite::{Connection, ErrorCode};
use std::time::Duration;

/// Virtual machine instructions between two context checks.
const PROGRESS_CHECK_INTERVAL: i32 = 1_000;

/// Added to a capped busy timeout so millisecond truncation never ends the
/// wait before the deadline.
const BUSY_CAP_SLACK: Duration = Duration::from_millis(1);

pub(crate) fn run_guarded<T, F>(conn: &Connection, ctx: &OpContext, call: F) -> Result<T, StoreError>
where
    F: FnOnce(&Connection) -> rusqlite::Result<T>,
{
    ctx.check()?;

    let restore_busy = cap_busy_timeout(conn, ctx)?;
    let watched = ctx.clone();
    conn.progress_handler(
        PROGRESS_CHECK_INTERVAL,
        Some(move || watched.check().is_err()),
    );
    let outcome = call(conn);
    conn.progress_handler(0, None::<fn() -> bool>);
    if let Some(configured) = restore_busy {
        if let Err(err) = conn.busy_timeout(configured) {
            warn!(
                "event=busy_timeout_restore module=db status=error timeout_ms={} error={}",
                configured.as_millis(),
                err
            );
        }
    }

    outcome.map_err(|err| classify(err, ctx, restore_busy.is_some()))
}

/// Lowers the busy timeout to the time left on `ctx`.
///
/// Returns the configured timeout to restore, or `None` when nothing changed.
fn cap_busy_timeout(conn: &Connection, ctx: &OpContext) -> Result<Option<Duration>, StoreError> {
    let Some(remaining) = ctx.remaining() else {
        return Ok(None);
    };
    let configured_ms: u64 = conn.query_row("PRAGMA busy_timeout;", [], |row| row.get(0))?;
    let configured = Duration::from_millis(configured_ms);
    let capped = remaining + BUSY_CAP_SLACK;
    if capped >= configured {
        return Ok(None);
    }
    conn.busy_timeout(capped)?;
    Ok(Some(configured))
}

fn classify(err: rusqlite::Error, ctx: &OpContext, busy_capped: bool) -> StoreError {
    let busy = is_busy(&err);
    if busy || is_interrupt(&err) {
        if let Err(ctx_err) = ctx.check() {
            return StoreError::Context(ctx_err);
        }
        if busy && busy_capped {
            return StoreError::Context(ContextError::DeadlineExceeded);
        }
    }
    StoreError::Sqlite(err)
}

fn is_interrupt(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::OperationInterrupted
    )
}

fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if matches!(failure.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}
