//! Extension repository contract and SQLite implementation.
//!
//! # Invariants
//! - Lookups are exact (case-sensitive) matches on `extensions.code`.
//! - `block_id` is returned as stored; the block itself is not loaded.

use crate::context::OpContext;
use crate::db::StoreScope;
use crate::model::extension::Extension;
use crate::model::record::Timestamps;
use crate::repo::{find_one, log_query, Lookup, RepoOp, RepoResult};
use rusqlite::Row;
use std::time::Instant;

const ENTITY: &str = "extension";

const EXTENSION_SELECT_SQL: &str = "SELECT
    id,
    name,
    code,
    block_id,
    release_date,
    created_at,
    updated_at,
    deleted_at
FROM extensions";

/// Repository interface for extension lookups.
pub trait ExtensionRepository {
    /// Finds the live extension whose code equals `code`.
    fn find_by_code(&self, ctx: &OpContext, code: &str) -> RepoResult<Extension>;
}

/// SQLite-backed extension repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteExtensionRepository<'h> {
    scope: StoreScope<'h>,
}

impl<'h> SqliteExtensionRepository<'h> {
    pub fn new(scope: StoreScope<'h>) -> Self {
        Self { scope }
    }

    pub fn lookup_by_code(&self, ctx: &OpContext, code: &str) -> Lookup<Extension> {
        find_one(
            &self.scope,
            ctx,
            &format!("{EXTENSION_SELECT_SQL} WHERE code = ?1 AND deleted_at IS NULL;"),
            [code],
            parse_extension_row,
        )
    }
}

impl ExtensionRepository for SqliteExtensionRepository<'_> {
    fn find_by_code(&self, ctx: &OpContext, code: &str) -> RepoResult<Extension> {
        let started_at = Instant::now();
        let outcome = self
            .lookup_by_code(ctx, code)
            .into_result(RepoOp::Find, ENTITY, code);
        log_query(RepoOp::Find, ENTITY, code, started_at, &outcome);
        outcome
    }
}

fn parse_extension_row(row: &Row<'_>) -> rusqlite::Result<Extension> {
    Ok(Extension {
        id: row.get("id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        block_id: row.get("block_id")?,
        release_date: row.get("release_date")?,
        timestamps: Timestamps {
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            deleted_at: row.get("deleted_at")?,
        },
    })
}
