//! Identity and audit columns shared by every catalog table.

use serde::{Deserialize, Serialize};

/// Store-assigned row identity. `0` means "not persisted yet".
pub type RecordId = i64;

/// Creation/update/tombstone timestamps in epoch milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: i64,
    pub updated_at: i64,
    /// Soft-delete tombstone. Rows with a value are invisible to lookups.
    pub deleted_at: Option<i64>,
}

impl Timestamps {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
