//! Item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Insert item rows and hand the assigned identity back to the caller.
//! - Load an item together with its extension, type and language in one query.
//!
//! # Invariants
//! - `create` never validates references itself; foreign-key and `CHECK`
//!   violations surface as wrapped store errors.
//! - `find_by_id` returns either a fully loaded item or an error.

use crate::context::OpContext;
use crate::db::StoreScope;
use crate::model::extension::Extension;
use crate::model::item::Item;
use crate::model::item_type::ItemType;
use crate::model::language::Language;
use crate::model::record::{RecordId, Timestamps};
use crate::repo::{find_one, log_query, store_failure, Lookup, RepoOp, RepoResult};
use rusqlite::{params, Row};
use std::time::Instant;

const ENTITY: &str = "item";

/// Key reported for failures on rows that have no identity yet.
const NEW_ITEM_KEY: &str = "new";

const ITEM_GRAPH_SELECT_SQL: &str = "SELECT
    i.id AS id,
    i.extension_id AS extension_id,
    i.type_id AS type_id,
    i.language_id AS language_id,
    i.price AS price,
    i.created_at AS created_at,
    i.updated_at AS updated_at,
    i.deleted_at AS deleted_at,
    e.name AS extension_name,
    e.code AS extension_code,
    e.block_id AS extension_block_id,
    e.release_date AS extension_release_date,
    e.created_at AS extension_created_at,
    e.updated_at AS extension_updated_at,
    e.deleted_at AS extension_deleted_at,
    t.name AS type_name,
    t.created_at AS type_created_at,
    t.updated_at AS type_updated_at,
    t.deleted_at AS type_deleted_at,
    l.code AS language_code,
    l.name AS language_name,
    l.created_at AS language_created_at,
    l.updated_at AS language_updated_at,
    l.deleted_at AS language_deleted_at
FROM items i
INNER JOIN extensions e ON e.id = i.extension_id
INNER JOIN item_types t ON t.id = i.type_id
INNER JOIN languages l ON l.id = i.language_id";

/// Repository interface for item persistence.
pub trait ItemRepository {
    /// Inserts `item` and writes the assigned id and timestamps back into it.
    fn create(&self, ctx: &OpContext, item: &mut Item) -> RepoResult<()>;
    /// Loads a live item with all associations populated.
    fn find_by_id(&self, ctx: &OpContext, id: RecordId) -> RepoResult<Item>;
    /// Number of live (not soft-deleted) items.
    fn count(&self, ctx: &OpContext) -> RepoResult<u64>;
}

/// SQLite-backed item repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteItemRepository<'h> {
    scope: StoreScope<'h>,
}

impl<'h> SqliteItemRepository<'h> {
    pub fn new(scope: StoreScope<'h>) -> Self {
        Self { scope }
    }

    pub fn lookup_by_id(&self, ctx: &OpContext, id: RecordId) -> Lookup<Item> {
        find_one(
            &self.scope,
            ctx,
            &format!("{ITEM_GRAPH_SELECT_SQL} WHERE i.id = ?1 AND i.deleted_at IS NULL;"),
            [id],
            parse_item_graph_row,
        )
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create(&self, ctx: &OpContext, item: &mut Item) -> RepoResult<()> {
        let started_at = Instant::now();
        let inserted = self.scope.with_connection(ctx, |conn| {
            conn.query_row(
                "INSERT INTO items (
                    extension_id,
                    type_id,
                    language_id,
                    price
                ) VALUES (?1, ?2, ?3, ?4)
                RETURNING id, created_at, updated_at;",
                params![
                    item.extension_id,
                    item.type_id,
                    item.language_id,
                    item.price,
                ],
                |row| {
                    Ok((
                        row.get::<_, RecordId>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
        });

        let outcome = match inserted {
            Ok((id, created_at, updated_at)) => {
                item.id = id;
                item.timestamps = Timestamps {
                    created_at,
                    updated_at,
                    deleted_at: None,
                };
                Ok(())
            }
            Err(err) => Err(store_failure(RepoOp::Create, ENTITY, NEW_ITEM_KEY, err)),
        };
        log_query(RepoOp::Create, ENTITY, NEW_ITEM_KEY, started_at, &outcome);
        outcome
    }

    fn find_by_id(&self, ctx: &OpContext, id: RecordId) -> RepoResult<Item> {
        let started_at = Instant::now();
        let key = id.to_string();
        let outcome = self
            .lookup_by_id(ctx, id)
            .into_result(RepoOp::Find, ENTITY, &key);
        log_query(RepoOp::Find, ENTITY, &key, started_at, &outcome);
        outcome
    }

    fn count(&self, ctx: &OpContext) -> RepoResult<u64> {
        let started_at = Instant::now();
        let outcome = self
            .scope
            .with_connection(ctx, |conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM items WHERE deleted_at IS NULL;",
                    [],
                    |row| row.get::<_, i64>(0),
                )
            })
            .map(|count| u64::try_from(count).unwrap_or_default())
            .map_err(|err| store_failure(RepoOp::Count, ENTITY, "*", err));
        log_query(RepoOp::Count, ENTITY, "*", started_at, &outcome);
        outcome
    }
}

fn parse_item_graph_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    let extension_id: RecordId = row.get("extension_id")?;
    let type_id: RecordId = row.get("type_id")?;
    let language_id: RecordId = row.get("language_id")?;

    let extension = Extension {
        id: extension_id,
        name: row.get("extension_name")?,
        code: row.get("extension_code")?,
        block_id: row.get("extension_block_id")?,
        release_date: row.get("extension_release_date")?,
        timestamps: Timestamps {
            created_at: row.get("extension_created_at")?,
            updated_at: row.get("extension_updated_at")?,
            deleted_at: row.get("extension_deleted_at")?,
        },
    };
    let item_type = ItemType {
        id: type_id,
        name: row.get("type_name")?,
        timestamps: Timestamps {
            created_at: row.get("type_created_at")?,
            updated_at: row.get("type_updated_at")?,
            deleted_at: row.get("type_deleted_at")?,
        },
    };
    let language = Language {
        id: language_id,
        code: row.get("language_code")?,
        name: row.get("language_name")?,
        timestamps: Timestamps {
            created_at: row.get("language_created_at")?,
            updated_at: row.get("language_updated_at")?,
            deleted_at: row.get("language_deleted_at")?,
        },
    };

    Ok(Item {
        id: row.get("id")?,
        extension_id,
        type_id,
        language_id,
        price: row.get("price")?,
        timestamps: Timestamps {
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            deleted_at: row.get("deleted_at")?,
        },
        extension: Some(extension),
        item_type: Some(item_type),
        language: Some(language),
    })
}
