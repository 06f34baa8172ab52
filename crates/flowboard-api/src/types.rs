// ── Wire types exchanged with the remote ──
//
// Stages travel as their string names; the core crate owns the typed
// model and converts at the boundary.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// The four remote operations.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Create,
    Relocate,
    Remove,
    Rename,
}

impl Operation {
    pub const ALL: [Self; 4] = [Self::Create, Self::Relocate, Self::Remove, Self::Rename];

    /// Human-readable reason attached to an injected failure.
    pub fn failure_reason(self) -> &'static str {
        match self {
            Self::Create => "network error while creating the item",
            Self::Relocate => "network error while moving the item",
            Self::Remove => "network error while deleting the item",
            Self::Rename => "network error while renaming the item",
        }
    }
}

/// Payload of a `create` call: the client's provisional copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub provisional_id: String,
    pub title: String,
    pub stage: String,
    pub created_at: u64,
}

/// An item as the remote reports it after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    /// Canonical identifier minted by the remote.
    pub id: String,
    pub title: String,
    pub stage: String,
    pub created_at: u64,
}

/// Acknowledgement for operations that return no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub operation: Operation,
    pub id: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn operation_names_are_snake_case() {
        assert_eq!(Operation::Relocate.to_string(), "relocate");
        let parsed: Operation = "rename".parse().unwrap();
        assert_eq!(parsed, Operation::Rename);
    }

    #[test]
    fn every_operation_has_a_reason() {
        for op in Operation::ALL {
            assert!(!op.failure_reason().is_empty());
        }
    }
}
