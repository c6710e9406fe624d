mod common;

use pkmc_core::{
    CreateItemRequest, ItemField, ItemService, ItemServiceError, OpContext, Price,
};
use rusqlite::Connection;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn create_item_round_trip_loads_associations() {
    let store = common::seeded_memory_store();
    let service = ItemService::new(store.clone());
    let ctx = OpContext::background();

    let item = service
        .create_item(&ctx, "DRI", "fr", "Display", Price::from_f64(129.99))
        .unwrap();

    assert!(item.id > 0);
    let price = item.price.unwrap();
    assert!((price.as_f64() - 129.99).abs() < 0.001);
    assert_eq!(item.extension.as_ref().unwrap().code, "DRI");
    assert_eq!(item.language.as_ref().unwrap().code, "fr");
    assert_eq!(item.item_type.as_ref().unwrap().name, "Display");
    assert_eq!(item.extension_id, item.extension.as_ref().unwrap().id);
    assert_eq!(common::count_items(&store), 1);
}

#[test]
fn create_item_without_price_stores_null() {
    let store = common::seeded_memory_store();
    let service = ItemService::new(store);
    let ctx = OpContext::background();

    let item = service
        .create_item(&ctx, "SVI", "en", "Booster", None)
        .unwrap();
    assert_eq!(item.price, None);
    assert!(item.is_fully_loaded());
}

#[test]
fn create_item_from_request_matches_positional_call() {
    let service = ItemService::new(common::seeded_memory_store());
    let request = CreateItemRequest {
        extension_code: "MEW".to_string(),
        language_code: "de".to_string(),
        item_type_name: "ETB".to_string(),
        price: Some(Price::from_cents(6_000)),
    };

    let item = service
        .create_item_from(&OpContext::background(), &request)
        .unwrap();
    assert_eq!(item.price, Some(Price::from_cents(6_000)));
    assert_eq!(item.extension.unwrap().code, "MEW");
}

#[test]
fn unknown_extension_fails_and_leaves_no_item() {
    let store = common::seeded_memory_store();
    let service = ItemService::new(store.clone());

    let err = service
        .create_item(&OpContext::background(), "INVALID", "fr", "Display", None)
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.unresolved_field(), Some((ItemField::Extension, "INVALID")));
    let message = err.to_string();
    assert!(message.starts_with("item_service create_item failed: "));
    assert!(message.contains("extension 'INVALID' not found"));
    assert_eq!(common::count_items(&store), 0);
}

#[test]
fn first_unresolved_input_wins() {
    let service = ItemService::new(common::seeded_memory_store());
    let ctx = OpContext::background();

    let err = service
        .create_item(&ctx, "INVALID", "xx", "Nope", None)
        .unwrap_err();
    assert_eq!(err.unresolved_field(), Some((ItemField::Extension, "INVALID")));

    let err = service.create_item(&ctx, "DRI", "xx", "Nope", None).unwrap_err();
    assert_eq!(err.unresolved_field(), Some((ItemField::Language, "xx")));
    assert!(err.to_string().contains("language 'xx' not found"));

    let err = service.create_item(&ctx, "DRI", "fr", "Nope", None).unwrap_err();
    assert_eq!(err.unresolved_field(), Some((ItemField::ItemType, "Nope")));
    assert!(err.to_string().contains("item type 'Nope' not found"));
}

#[test]
fn failed_insert_rolls_back_the_whole_operation() {
    let store = common::seeded_memory_store();
    let service = ItemService::new(store.clone());

    let err = service
        .create_item(
            &OpContext::background(),
            "DRI",
            "fr",
            "Display",
            Some(Price::from_cents(-100)),
        )
        .unwrap_err();

    assert!(matches!(err, ItemServiceError::CreateFailed(_)));
    assert!(err.to_string().contains("failed to create item"));
    assert!(err
        .root_store_error()
        .is_some_and(|store_err| store_err.is_constraint_violation()));
    assert_eq!(common::count_items(&store), 0);
}

#[test]
fn expired_context_fails_before_any_work() {
    let store = common::seeded_memory_store();
    let service = ItemService::new(store.clone());

    let err = service
        .create_item(&common::expired_context(), "DRI", "fr", "Display", None)
        .unwrap_err();

    assert!(matches!(&err, ItemServiceError::Transaction(tx) if tx.is_begin()));
    assert!(err.is_deadline_exceeded());
    assert_eq!(common::count_items(&store), 0);
}

#[test]
fn canceled_context_is_not_reported_as_not_found() {
    let service = ItemService::new(common::seeded_memory_store());
    let ctx = OpContext::background();
    ctx.cancel();

    let err = service
        .create_item(&ctx, "DRI", "fr", "Display", None)
        .unwrap_err();
    assert!(!err.is_not_found());
    assert!(err
        .root_store_error()
        .is_some_and(|store_err| store_err.is_canceled()));
}

#[test]
fn concurrent_creates_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::seeded_file_store(dir.path());
    let service = ItemService::new(store.clone());

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let service = service.clone();
            thread::spawn(move || {
                service.create_item(
                    &OpContext::background(),
                    "DRI",
                    "fr",
                    "Display",
                    Some(Price::from_cents(1_000 + n)),
                )
            })
        })
        .collect();

    let mut ids: Vec<i64> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap().id)
        .collect();
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 8);
    assert_eq!(common::count_items(&store), 8);
}

#[test]
fn created_item_serializes_with_nested_associations() {
    let service = ItemService::new(common::seeded_memory_store());
    let item = service
        .create_item(&OpContext::background(), "DRI", "fr", "Display", Price::from_f64(129.99))
        .unwrap();

    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["price"], serde_json::json!(129.99));
    assert_eq!(json["type"]["name"], "Display");
    assert_eq!(json["extension"]["code"], "DRI");
    assert_eq!(json["language"]["code"], "fr");
}

#[test]
fn deadline_is_honored_while_another_writer_holds_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::seeded_file_store(dir.path());
    let service = ItemService::new(store.clone());

    let writer = Connection::open(dir.path().join("catalog.db")).unwrap();
    writer.execute_batch("BEGIN IMMEDIATE;").unwrap();

    let started_at = Instant::now();
    let err = service
        .create_item(
            &OpContext::with_timeout(Duration::from_millis(100)),
            "DRI",
            "fr",
            "Display",
            None,
        )
        .unwrap_err();

    assert!(started_at.elapsed() < Duration::from_secs(2));
    assert!(matches!(&err, ItemServiceError::Transaction(tx) if tx.is_begin()));
    assert!(err.is_deadline_exceeded());

    writer.execute_batch("ROLLBACK;").unwrap();
    let item = service
        .create_item(&OpContext::background(), "DRI", "fr", "Display", None)
        .unwrap();
    assert!(item.is_persisted());
    assert_eq!(common::count_items(&store), 1);
}
