//! Language repository contract and SQLite implementation.

use crate::context::OpContext;
use crate::db::StoreScope;
use crate::model::language::Language;
use crate::model::record::Timestamps;
use crate::repo::{find_one, log_query, Lookup, RepoOp, RepoResult};
use rusqlite::Row;
use std::time::Instant;

const ENTITY: &str = "language";

pub trait LanguageRepository {
    fn find_by_code(&self, ctx: &OpContext, code: &str) -> RepoResult<Language>;
}

#[derive(Debug, Clone, Copy)]
pub struct SqliteLanguageRepository<'h> {
    scope: StoreScope<'h>,
}

impl<'h> SqliteLanguageRepository<'h> {
    pub fn new(scope: StoreScope<'h>) -> Self {
        Self { scope }
    }

    pub fn lookup_by_code(&self, ctx: &OpContext, code: &str) -> Lookup<Language> {
        find_one(
            &self.scope,
            ctx,
            "SELECT id, code, name, created_at, updated_at, deleted_at
             FROM languages
             WHERE code = ?1
               AND deleted_at IS NULL;",
            [code],
            parse_language_row,
        )
    }
}

impl LanguageRepository for SqliteLanguageRepository<'_> {
    fn find_by_code(&self, ctx: &OpContext, code: &str) -> RepoResult<Language> {
        let started_at = Instant::now();
        let outcome = self
            .lookup_by_code(ctx, code)
            .into_result(RepoOp::Find, ENTITY, code);
        log_query(RepoOp::Find, ENTITY, code, started_at, &outcome);
        outcome
    }
}

fn parse_language_row(row: &Row<'_>) -> rusqlite::Result<Language> {
    Ok(Language {
        id: row.get("id")?,
        code: row.get("code")?,
        name: row.get("name")?,
        timestamps: Timestamps {
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            deleted_at: row.get("deleted_at")?,
        },
    })
}
