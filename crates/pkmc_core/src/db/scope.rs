//! Handle binding used by repositories.
//!
//! A repository never owns a connection. It holds a `StoreScope`, which is
//! either the ambient pooled store (each call checks out its own connection)
//! or the connection of an open transaction (every call joins it).

use super::{run_guarded, Store, StoreError};
use crate::context::OpContext;
use rusqlite::Connection;

#[derive(Clone, Copy)]
pub enum StoreScope<'h> {
    /// Outside any transaction; calls auto-commit on a pooled connection.
    Ambient(&'h Store),
    /// Inside an open transaction on this connection.
    Transaction(&'h Connection),
}

impl std::fmt::Debug for StoreScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ambient(_) => write!(f, "StoreScope::Ambient"),
            Self::Transaction(_) => write!(f, "StoreScope::Transaction"),
        }
    }
}

impl<'h> StoreScope<'h> {
    pub fn is_transaction(&self) -> bool {
        matches!(self, Self::Transaction(_))
    }

    /// Runs one store call on the bound handle under `ctx`.
    pub fn with_connection<T, F>(&self, ctx: &OpContext, call: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        match self {
            Self::Ambient(store) => {
                let conn = store.checkout(ctx)?;
                run_guarded(&conn, ctx, call)
            }
            Self::Transaction(conn) => run_guarded(conn, ctx, call),
        }
    }
}
