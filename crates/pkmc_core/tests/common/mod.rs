#![allow(dead_code)]

use pkmc_core::{
    open_store, open_store_in_memory, seed_reference_data, OpContext, Store, StoreConfig,
};
use std::path::Path;
use std::time::{Duration, Instant};

/// In-memory store with migrations and reference data applied.
pub fn seeded_memory_store() -> Store {
    let store = open_store_in_memory().unwrap();
    seed_reference_data(&store, &OpContext::background()).unwrap();
    store
}

/// File store under `dir` with migrations and reference data applied.
pub fn seeded_file_store(dir: &Path) -> Store {
    let store = open_store(&StoreConfig::new(dir.join("catalog.db"))).unwrap();
    seed_reference_data(&store, &OpContext::background()).unwrap();
    store
}

/// Context whose deadline is already in the past.
pub fn expired_context() -> OpContext {
    OpContext::with_deadline(Instant::now() - Duration::from_millis(1))
}

pub fn count_items(store: &Store) -> i64 {
    let conn = store.checkout(&OpContext::background()).unwrap();
    conn.query_row("SELECT COUNT(*) FROM items;", [], |row| row.get(0))
        .unwrap()
}
