// ── Work item domain type ──

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use super::item_id::ItemId;
use crate::error::CoreError;

/// Lifecycle bucket an item occupies. Declaration order is presentation order.
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
pub enum Stage {
    Todo,
    InProgress,
    Done,
}

impl Stage {
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Stage assigned to newly created items.
    pub const fn first() -> Self {
        Self::Todo
    }

    /// Wire / storage name (`todo`, `in_progress`, `done`).
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Column heading shown to users.
    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

/// A single unit of work on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: ItemId,
    pub title: String,
    pub stage: Stage,
    /// Logical creation tick. Only used to restore chronological order.
    pub created_at: u64,
}

impl WorkItem {
    pub fn new(
        id: impl Into<ItemId>,
        title: impl Into<String>,
        stage: Stage,
        created_at: u64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            stage,
            created_at,
        }
    }
}

/// The fixed set a fresh board starts from (and returns to on logout).
pub fn default_seed() -> Vec<WorkItem> {
    vec![
        WorkItem::new("1", "Draft project brief", Stage::Todo, 0),
        WorkItem::new("2", "Set up repository", Stage::InProgress, 1),
        WorkItem::new("3", "Kickoff meeting", Stage::Done, 2),
    ]
}

/// Trim a user-supplied title, rejecting blank input.
pub(crate) fn normalize_title(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation {
            field: "title".into(),
            reason: "title must not be empty".into(),
        });
    }
    Ok(trimmed.to_owned())
}

/// Check the invariants a whole collection must hold before it is loaded.
pub(crate) fn check_collection(items: &[WorkItem]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(&item.id) {
            return Err(CoreError::InvalidState {
                message: format!("duplicate item id {}", item.id),
            });
        }
        if item.title.trim().is_empty() {
            return Err(CoreError::InvalidState {
                message: format!("item {} has an empty title", item.id),
            });
        }
        // New items are ticked after the newest one; MAX leaves no room.
        if item.created_at == u64::MAX {
            return Err(CoreError::InvalidState {
                message: format!("item {} has an out-of-range createdAt", item.id),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_match_storage_format() {
        assert_eq!(Stage::InProgress.as_str(), "in_progress");
        assert_eq!("done".parse::<Stage>().unwrap(), Stage::Done);
        assert_eq!(
            serde_json::to_string(&Stage::Todo).unwrap(),
            "\"todo\""
        );
    }

    #[test]
    fn first_stage_is_todo() {
        assert_eq!(Stage::first(), Stage::ALL[0]);
    }

    #[test]
    fn normalize_title_trims_and_rejects_blank() {
        assert_eq!(normalize_title("  Ship it ").unwrap(), "Ship it");
        assert!(matches!(
            normalize_title("   "),
            Err(CoreError::Validation { .. })
        ));
    }

    #[test]
    fn default_seed_is_a_valid_collection() {
        let seed = default_seed();
        assert_eq!(seed.len(), 3);
        check_collection(&seed).unwrap();
    }

    #[test]
    fn check_collection_rejects_duplicates() {
        let items = vec![
            WorkItem::new("a", "one", Stage::Todo, 0),
            WorkItem::new("a", "two", Stage::Done, 1),
        ];
        assert!(matches!(
            check_collection(&items),
            Err(CoreError::InvalidState { .. })
        ));
    }

    #[test]
    fn work_item_serializes_with_camel_case_fields() {
        let item = WorkItem::new("a", "Title", Stage::InProgress, 7);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["createdAt"], 7);
        assert_eq!(json["stage"], "in_progress");
    }
}
