// ── Mutation API ──
//
// Every write against the board can be expressed as a `Mutation` and
// routed through `Board::execute`. The typed convenience methods on the
// board build the same values.

use crate::model::{ItemId, Stage};
use crate::notification::MutationKind;

/// A write operation against the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create { title: String },
    Move { id: ItemId, stage: Stage },
    Remove { id: ItemId },
    Rename { id: ItemId, title: String },
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Create { .. } => MutationKind::Create,
            Self::Move { .. } => MutationKind::Move,
            Self::Remove { .. } => MutationKind::Remove,
            Self::Rename { .. } => MutationKind::Rename,
        }
    }
}

/// How a mutation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The remote accepted; local state already matched (or was finalized).
    Confirmed,
    /// The remote rejected; local state was reverted to the snapshot.
    RolledBack { reason: String },
    /// Nothing to do: unknown id, same stage, or same title.
    Unchanged,
    /// The collection was reset while the call was in flight. The outcome
    /// was dropped without touching the fresh collection.
    Discarded,
}

impl Settlement {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self, Self::RolledBack { .. })
    }

    /// Whether the outcome changed (or confirmed) board state and produced
    /// a notification.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Confirmed | Self::RolledBack { .. })
    }
}
