use crate::model::record::{RecordId, Timestamps};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Card set released inside a block (for example `DRI`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    pub id: RecordId,
    pub name: String,
    /// Natural key.
    pub code: String,
    /// Owning block; a block cannot be removed while extensions reference it.
    pub block_id: RecordId,
    pub release_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}
