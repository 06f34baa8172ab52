// ── Outcome notifications ──
//
// Every settled mutation produces exactly one of these. They are transient,
// meant for toast-style display, and never persisted.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use flowboard_api::Operation;

use crate::model::ItemId;

/// The four user-facing mutations.
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
pub enum MutationKind {
    Create,
    Move,
    Remove,
    Rename,
}

impl From<MutationKind> for Operation {
    fn from(kind: MutationKind) -> Self {
        match kind {
            MutationKind::Create => Operation::Create,
            MutationKind::Move => Operation::Relocate,
            MutationKind::Remove => Operation::Remove,
            MutationKind::Rename => Operation::Rename,
        }
    }
}

impl From<Operation> for MutationKind {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Create => MutationKind::Create,
            Operation::Relocate => MutationKind::Move,
            Operation::Remove => MutationKind::Remove,
            Operation::Rename => MutationKind::Rename,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Failure,
}

/// Outcome of one settled mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub operation: MutationKind,
    pub message: String,
    /// Item the mutation targeted. Canonical after a confirmed create.
    pub item_id: ItemId,
}

impl Notification {
    pub(crate) fn success(operation: MutationKind, item_id: ItemId, message: String) -> Self {
        Self {
            kind: NotificationKind::Success,
            operation,
            message,
            item_id,
        }
    }

    pub(crate) fn failure(operation: MutationKind, item_id: ItemId, message: String) -> Self {
        Self {
            kind: NotificationKind::Failure,
            operation,
            message,
            item_id,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_kinds_map_onto_remote_operations() {
        for kind in [
            MutationKind::Create,
            MutationKind::Move,
            MutationKind::Remove,
            MutationKind::Rename,
        ] {
            let op: Operation = kind.into();
            assert_eq!(MutationKind::from(op), kind);
        }
        assert_eq!(Operation::from(MutationKind::Move), Operation::Relocate);
    }
}
