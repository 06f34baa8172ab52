// ── Persisted state ──
//
// The shape a host saves between runs and hands back to
// `Board::restore`. How and where it is written is up to the host.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::item::check_collection;
use crate::model::{Session, WorkItem};

/// Everything needed to rebuild a board after a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub session: Option<Session>,
    pub items: Vec<WorkItem>,
}

impl PersistedState {
    /// Capture the current session and items. Provisional items are left
    /// out: their create can never settle after a restart.
    pub fn capture(session: Option<Session>, items: &[Arc<WorkItem>]) -> Self {
        Self {
            session,
            items: items
                .iter()
                .filter(|item| !item.id.is_provisional())
                .map(|item| (**item).clone())
                .collect(),
        }
    }

    /// Check the state can be loaded as-is.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(item) = self.items.iter().find(|item| item.id.is_provisional()) {
            return Err(CoreError::InvalidState {
                message: format!("persisted item {} has a provisional id", item.id),
            });
        }
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.identity.trim().is_empty())
        {
            return Err(CoreError::InvalidState {
                message: "persisted session has an empty identity".into(),
            });
        }
        check_collection(&self.items)
    }
}

/// Sink the board hands its state to after every settled change.
pub trait Persistence: Send + Sync {
    fn save(&self, state: &PersistedState) -> Result<(), CoreError>;
}

impl<F> Persistence for F
where
    F: Fn(&PersistedState) -> Result<(), CoreError> + Send + Sync,
{
    fn save(&self, state: &PersistedState) -> Result<(), CoreError> {
        self(state)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{ItemId, Stage, default_seed};

    #[test]
    fn capture_skips_provisional_items() {
        let items: Vec<Arc<WorkItem>> = vec![
            Arc::new(WorkItem::new("1", "Kept", Stage::Todo, 0)),
            Arc::new(WorkItem::new(ItemId::provisional(), "Pending", Stage::Todo, 1)),
        ];
        let state = PersistedState::capture(None, &items);
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].title, "Kept");
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let mut items = default_seed();
        items.push(WorkItem::new("1", "Again", Stage::Done, 9));
        let state = PersistedState {
            session: None,
            items,
        };
        assert!(matches!(
            state.validate(),
            Err(CoreError::InvalidState { .. })
        ));
    }

    #[test]
    fn validate_rejects_provisional_items() {
        let state = PersistedState {
            session: None,
            items: vec![WorkItem::new(ItemId::provisional(), "Pending", Stage::Todo, 0)],
        };
        assert!(state.validate().is_err());
    }

    #[test]
    fn validate_rejects_created_at_with_no_successor() {
        let state = PersistedState {
            session: None,
            items: vec![WorkItem::new("x", "X", Stage::Todo, u64::MAX)],
        };
        assert!(matches!(
            state.validate(),
            Err(CoreError::InvalidState { .. })
        ));
    }

    #[test]
    fn validate_accepts_created_at_just_below_max() {
        let state = PersistedState {
            session: None,
            items: vec![WorkItem::new("x", "X", Stage::Todo, u64::MAX - 1)],
        };
        assert!(state.validate().is_ok());
    }

    #[test]
    fn round_trips_through_json() {
        let state = PersistedState {
            session: None,
            items: default_seed(),
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"createdAt\":0"));
        let back: PersistedState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
