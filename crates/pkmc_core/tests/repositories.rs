mod common;

use pkmc_core::{
    BlockRepository, ExtensionRepository, Item, ItemRepository, ItemTypeRepository,
    LanguageRepository, Lookup, OpContext, Price, RepoOp, SqliteBlockRepository,
    SqliteExtensionRepository, SqliteItemRepository, SqliteItemTypeRepository,
    SqliteLanguageRepository,
};
use std::time::Duration;

#[test]
fn reference_lookups_resolve_seeded_natural_keys() {
    let store = common::seeded_memory_store();
    let ctx = OpContext::background();

    let extension = SqliteExtensionRepository::new(store.scope())
        .find_by_code(&ctx, "DRI")
        .unwrap();
    assert_eq!(extension.code, "DRI");
    assert_eq!(extension.name, "Rivalités Destinées");
    assert!(extension.id > 0);

    let block = SqliteBlockRepository::new(store.scope())
        .find_by_code(&ctx, "EV")
        .unwrap();
    assert_eq!(extension.block_id, block.id);
    assert!(block.release_date.is_some());

    let language = SqliteLanguageRepository::new(store.scope())
        .find_by_code(&ctx, "fr")
        .unwrap();
    assert_eq!(language.name, "Français");

    let item_type = SqliteItemTypeRepository::new(store.scope())
        .find_by_name(&ctx, "Display")
        .unwrap();
    assert_eq!(item_type.name, "Display");
}

#[test]
fn repeated_lookups_return_the_same_row() {
    let store = common::seeded_memory_store();
    let ctx = OpContext::background();
    let repo = SqliteExtensionRepository::new(store.scope());

    let first = repo.find_by_code(&ctx, "SVI").unwrap();
    let second = repo.find_by_code(&ctx, "SVI").unwrap();
    assert_eq!(first, second);
}

#[test]
fn unknown_natural_key_is_reported_as_not_found() {
    let store = common::seeded_memory_store();
    let ctx = OpContext::background();

    let err = SqliteExtensionRepository::new(store.scope())
        .find_by_code(&ctx, "INVALID")
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.op, RepoOp::Find);
    assert_eq!(err.entity, "extension");
    assert_eq!(err.key, "INVALID");
    assert_eq!(
        err.to_string(),
        "repository extension find failed for 'INVALID': entity not found"
    );

    let lookup = SqliteLanguageRepository::new(store.scope()).lookup_by_code(&ctx, "jp");
    assert!(matches!(lookup, Lookup::NotFound));
}

#[test]
fn lookups_are_case_sensitive() {
    let store = common::seeded_memory_store();
    let ctx = OpContext::background();

    let err = SqliteItemTypeRepository::new(store.scope())
        .find_by_name(&ctx, "display")
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn soft_deleted_rows_are_invisible() {
    let store = common::seeded_memory_store();
    let ctx = OpContext::background();
    {
        let conn = store.checkout(&ctx).unwrap();
        conn.execute(
            "UPDATE languages SET deleted_at = 1 WHERE code = 'de';",
            [],
        )
        .unwrap();
    }

    let err = SqliteLanguageRepository::new(store.scope())
        .find_by_code(&ctx, "de")
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn create_assigns_identity_and_find_by_id_loads_associations() {
    let store = common::seeded_memory_store();
    let ctx = OpContext::background();
    let extension = SqliteExtensionRepository::new(store.scope())
        .find_by_code(&ctx, "DRI")
        .unwrap();
    let language = SqliteLanguageRepository::new(store.scope())
        .find_by_code(&ctx, "en")
        .unwrap();
    let item_type = SqliteItemTypeRepository::new(store.scope())
        .find_by_name(&ctx, "ETB")
        .unwrap();

    let items = SqliteItemRepository::new(store.scope());
    let mut item = Item::new(
        extension.id,
        item_type.id,
        language.id,
        Some(Price::from_cents(5_499)),
    );
    assert!(!item.is_persisted());

    items.create(&ctx, &mut item).unwrap();
    assert!(item.is_persisted());
    assert!(item.timestamps.created_at > 0);
    assert!(!item.is_fully_loaded());

    let loaded = items.find_by_id(&ctx, item.id).unwrap();
    assert!(loaded.is_fully_loaded());
    assert_eq!(loaded.id, item.id);
    assert_eq!(loaded.price, Some(Price::from_cents(5_499)));
    assert_eq!(loaded.extension, Some(extension));
    assert_eq!(loaded.language, Some(language));
    assert_eq!(loaded.item_type, Some(item_type));
    assert_eq!(items.count(&ctx).unwrap(), 1);
}

#[test]
fn create_with_dangling_reference_is_a_constraint_violation() {
    let store = common::seeded_memory_store();
    let ctx = OpContext::background();
    let items = SqliteItemRepository::new(store.scope());

    let mut item = Item::new(9_999, 9_999, 9_999, None);
    let err = items.create(&ctx, &mut item).unwrap_err();

    assert!(!err.is_not_found());
    assert!(err.is_constraint_violation());
    assert_eq!(err.op, RepoOp::Create);
    assert_eq!(err.key, "new");
    assert!(!item.is_persisted());
    assert_eq!(items.count(&ctx).unwrap(), 0);
}

#[test]
fn find_by_id_on_missing_row_is_not_found() {
    let store = common::seeded_memory_store();
    let err = SqliteItemRepository::new(store.scope())
        .find_by_id(&OpContext::background(), 42)
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.key, "42");
}

#[test]
fn expired_context_never_reaches_the_store() {
    let store = common::seeded_memory_store();
    let ctx = common::expired_context();

    let err = SqliteExtensionRepository::new(store.scope())
        .find_by_code(&ctx, "DRI")
        .unwrap_err();
    assert!(!err.is_not_found());
    assert!(err.is_deadline_exceeded());
}

#[test]
fn canceled_context_is_reported_as_canceled() {
    let store = common::seeded_memory_store();
    let ctx = OpContext::background();
    ctx.cancel();

    let err = SqliteLanguageRepository::new(store.scope())
        .find_by_code(&ctx, "fr")
        .unwrap_err();
    assert!(err.store_error().is_some_and(|store_err| store_err.is_canceled()));
}

#[test]
fn running_statement_is_interrupted_when_the_deadline_passes() {
    let store = common::seeded_memory_store();
    let ctx = OpContext::with_timeout(Duration::from_millis(50));

    let err = store
        .scope()
        .with_connection(&ctx, |conn| {
            conn.query_row(
                "WITH RECURSIVE counter(x) AS (
                    SELECT 1 UNION ALL SELECT x + 1 FROM counter
                )
                SELECT COUNT(*) FROM counter;",
                [],
                |row| row.get::<_, i64>(0),
            )
        })
        .unwrap_err();
    assert!(err.is_deadline_exceeded());

    // The connection stays usable once the handler is removed.
    let language = SqliteLanguageRepository::new(store.scope())
        .find_by_code(&OpContext::background(), "fr")
        .unwrap();
    assert_eq!(language.code, "fr");
}

#[test]
fn price_beyond_column_precision_is_rejected_on_insert() {
    let store = common::seeded_memory_store();
    let ctx = OpContext::background();
    let extension = SqliteExtensionRepository::new(store.scope())
        .find_by_code(&ctx, "DRI")
        .unwrap();
    let language = SqliteLanguageRepository::new(store.scope())
        .find_by_code(&ctx, "fr")
        .unwrap();
    let item_type = SqliteItemTypeRepository::new(store.scope())
        .find_by_name(&ctx, "Display")
        .unwrap();

    let items = SqliteItemRepository::new(store.scope());
    let mut item = Item::new(
        extension.id,
        item_type.id,
        language.id,
        Some(Price::from_cents(10_000_000_001)),
    );
    let err = items.create(&ctx, &mut item).unwrap_err();

    assert!(err.is_constraint_violation());
    assert_eq!(items.count(&ctx).unwrap(), 0);
}

#[test]
fn busy_timeout_is_capped_by_the_deadline_and_restored_after_the_call() {
    let store = common::seeded_memory_store();
    let busy_timeout = |conn: &rusqlite::Connection| {
        conn.query_row("PRAGMA busy_timeout;", [], |row| row.get::<_, i64>(0))
    };

    let during = store
        .scope()
        .with_connection(&OpContext::with_timeout(Duration::from_secs(1)), busy_timeout)
        .unwrap();
    assert!(during <= 1_001, "busy timeout {during} exceeds the deadline");

    let after = store
        .scope()
        .with_connection(&OpContext::background(), busy_timeout)
        .unwrap();
    assert_eq!(after, 5_000);
}
