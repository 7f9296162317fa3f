use serde::{Deserialize, Serialize};

use itemstore_core::ChangeId;

/// Envelope for a committed change, carrying table + ordering metadata.
///
/// Notes:
/// - `table` names the persisted collection the change touched (e.g. `items`).
/// - `sequence_number` is monotonically increasing per store, in commit order.
/// - `payload` is the typed change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEnvelope<E> {
    change_id: ChangeId,
    table: String,

    /// Position of this change in the store's commit order.
    sequence_number: u64,

    payload: E,
}

impl<E> ChangeEnvelope<E> {
    pub fn new(
        change_id: ChangeId,
        table: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            change_id,
            table: table.into(),
            sequence_number,
            payload,
        }
    }

    pub fn change_id(&self) -> ChangeId {
        self.change_id
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }
}
