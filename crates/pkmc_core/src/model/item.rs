//! Item domain model.
//!
//! # Invariants
//! - `extension_id`, `type_id` and `language_id` must reference live rows
//!   when the item is inserted (enforced by foreign keys in the store).
//! - Associations are either absent (not loaded) or all three loaded by
//!   `ItemRepository::find_by_id`.

use crate::model::extension::Extension;
use crate::model::item_type::ItemType;
use crate::model::language::Language;
use crate::model::price::Price;
use crate::model::record::{RecordId, Timestamps};
use serde::{Deserialize, Serialize};

/// Inventory item: one sealed product of an extension, in a language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// `0` until the item repository inserts the row.
    pub id: RecordId,
    pub extension_id: RecordId,
    pub type_id: RecordId,
    pub language_id: RecordId,
    pub price: Option<Price>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<Extension>,
    /// Serialized as `type` to match the `type_id` column naming.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl Item {
    /// Builds an unsaved item referencing already-resolved reference rows.
    pub fn new(
        extension_id: RecordId,
        type_id: RecordId,
        language_id: RecordId,
        price: Option<Price>,
    ) -> Self {
        Self {
            id: 0,
            extension_id,
            type_id,
            language_id,
            price,
            timestamps: Timestamps::default(),
            extension: None,
            item_type: None,
            language: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// Whether all three associations are populated.
    pub fn is_fully_loaded(&self) -> bool {
        self.extension.is_some() && self.item_type.is_some() && self.language.is_some()
    }
}
