use crate::model::record::{RecordId, Timestamps};
use serde::{Deserialize, Serialize};

/// Print language of an item. `code` (for example `fr`) is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: RecordId,
    pub code: String,
    pub name: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}
