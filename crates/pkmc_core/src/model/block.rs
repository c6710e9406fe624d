use crate::model::record::{RecordId, Timestamps};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Product block grouping several extensions (for example `EV`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: RecordId,
    pub name: String,
    /// Natural key.
    pub code: String,
    pub release_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}
