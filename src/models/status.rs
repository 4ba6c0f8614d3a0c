//! Soft-delete status shared by persisted records.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a persisted record.
///
/// Records are never physically removed; deleting one flips it to
/// [`RecordStatus::Deleted`] and every repository query filters on
/// [`RecordStatus::Active`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Visible to queries.
    #[default]
    Active,
    /// Soft-deleted.
    Deleted,
}

impl RecordStatus {
    /// Returns true for [`RecordStatus::Active`].
    pub fn is_active(self) -> bool {
        self == RecordStatus::Active
    }
}
