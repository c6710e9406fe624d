//! Item type repository contract and SQLite implementation.

use crate::context::OpContext;
use crate::db::StoreScope;
use crate::model::item_type::ItemType;
use crate::model::record::Timestamps;
use crate::repo::{find_one, log_query, Lookup, RepoOp, RepoResult};
use rusqlite::Row;
use std::time::Instant;

const ENTITY: &str = "item_type";

pub trait ItemTypeRepository {
    /// Finds the live item type whose name equals `name`.
    fn find_by_name(&self, ctx: &OpContext, name: &str) -> RepoResult<ItemType>;
}

#[derive(Debug, Clone, Copy)]
pub struct SqliteItemTypeRepository<'h> {
    scope: StoreScope<'h>,
}

impl<'h> SqliteItemTypeRepository<'h> {
    pub fn new(scope: StoreScope<'h>) -> Self {
        Self { scope }
    }

    pub fn lookup_by_name(&self, ctx: &OpContext, name: &str) -> Lookup<ItemType> {
        find_one(
            &self.scope,
            ctx,
            "SELECT id, name, created_at, updated_at, deleted_at
             FROM item_types
             WHERE name = ?1
               AND deleted_at IS NULL;",
            [name],
            parse_item_type_row,
        )
    }
}

impl ItemTypeRepository for SqliteItemTypeRepository<'_> {
    fn find_by_name(&self, ctx: &OpContext, name: &str) -> RepoResult<ItemType> {
        let started_at = Instant::now();
        let outcome = self
            .lookup_by_name(ctx, name)
            .into_result(RepoOp::Find, ENTITY, name);
        log_query(RepoOp::Find, ENTITY, name, started_at, &outcome);
        outcome
    }
}

fn parse_item_type_row(row: &Row<'_>) -> rusqlite::Result<ItemType> {
    Ok(ItemType {
        id: row.get("id")?,
        name: row.get("name")?,
        timestamps: Timestamps {
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            deleted_at: row.get("deleted_at")?,
        },
    })
}
