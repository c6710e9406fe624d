//! Catalog domain model.
//!
//! # Responsibility
//! - Define reference entities (block, extension, item type, language) and
//!   the transactional `Item` record.
//! - Keep storage identity (`RecordId`) separate from natural keys.
//!
//! # Invariants
//! - Numeric identity is assigned by the store, never by a caller.
//! - Deletion is represented by a `deleted_at` tombstone, not hard delete.

pub mod block;
pub mod extension;
pub mod item;
pub mod item_type;
pub mod language;
pub mod price;
pub mod record;
