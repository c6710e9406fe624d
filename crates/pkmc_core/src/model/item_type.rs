use crate::model::record::{RecordId, Timestamps};
use serde::{Deserialize, Serialize};

/// Kind of sealed product (`Display`, `ETB`, ...). `name` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemType {
    pub id: RecordId,
    pub name: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}
