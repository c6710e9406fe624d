//! Block repository contract and SQLite implementation.

use crate::context::OpContext;
use crate::db::StoreScope;
use crate::model::block::Block;
use crate::model::record::Timestamps;
use crate::repo::{find_one, log_query, Lookup, RepoOp, RepoResult};
use rusqlite::Row;
use std::time::Instant;

const ENTITY: &str = "block";

const BLOCK_SELECT_SQL: &str = "SELECT
    id,
    name,
    code,
    release_date,
    created_at,
    updated_at,
    deleted_at
FROM blocks";

pub trait BlockRepository {
    fn find_by_code(&self, ctx: &OpContext, code: &str) -> RepoResult<Block>;
}

/// SQLite-backed block repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteBlockRepository<'h> {
    scope: StoreScope<'h>,
}

impl<'h> SqliteBlockRepository<'h> {
    pub fn new(scope: StoreScope<'h>) -> Self {
        Self { scope }
    }

    pub fn lookup_by_code(&self, ctx: &OpContext, code: &str) -> Lookup<Block> {
        find_one(
            &self.scope,
            ctx,
            &format!("{BLOCK_SELECT_SQL} WHERE code = ?1 AND deleted_at IS NULL;"),
            [code],
            parse_block_row,
        )
    }
}

impl BlockRepository for SqliteBlockRepository<'_> {
    fn find_by_code(&self, ctx: &OpContext, code: &str) -> RepoResult<Block> {
        let started_at = Instant::now();
        let outcome = self
            .lookup_by_code(ctx, code)
            .into_result(RepoOp::Find, ENTITY, code);
        log_query(RepoOp::Find, ENTITY, code, started_at, &outcome);
        outcome
    }
}

fn parse_block_row(row: &Row<'_>) -> rusqlite::Result<Block> {
    Ok(Block {
        id: row.get("id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        release_date: row.get("release_date")?,
        timestamps: Timestamps {
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            deleted_at: row.get("deleted_at")?,
        },
    })
}
