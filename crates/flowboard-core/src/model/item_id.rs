// ── Item identity ──
//
// Items start life with a client-minted provisional id and switch to the
// canonical id the remote assigns once creation is confirmed. Both forms
// travel as plain strings; the `tmp-` prefix marks provisional ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const PROVISIONAL_PREFIX: &str = "tmp-";

/// Identifier of a [`WorkItem`](super::WorkItem).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemId {
    /// Client-minted, used until the remote confirms creation.
    Provisional(Uuid),
    /// Assigned by the remote.
    Canonical(String),
}

impl ItemId {
    /// Mint a fresh provisional id.
    pub fn provisional() -> Self {
        Self::Provisional(Uuid::new_v4())
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self, Self::Provisional(_))
    }

    pub fn as_canonical(&self) -> Option<&str> {
        match self {
            Self::Canonical(s) => Some(s),
            Self::Provisional(_) => None,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provisional(u) => write!(f, "{PROVISIONAL_PREFIX}{u}"),
            Self::Canonical(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for ItemId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        match s
            .strip_prefix(PROVISIONAL_PREFIX)
            .and_then(|rest| Uuid::parse_str(rest).ok())
        {
            Some(u) => Self::Provisional(u),
            None => Self::Canonical(s),
        }
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn provisional_ids_round_trip_through_strings() {
        let id = ItemId::provisional();
        let text = id.to_string();
        assert!(text.starts_with("tmp-"));
        assert_eq!(ItemId::from(text), id);
    }

    #[test]
    fn plain_strings_are_canonical() {
        let id: ItemId = "42".parse().unwrap();
        assert_eq!(id.as_canonical(), Some("42"));
        assert!(!id.is_provisional());
    }

    #[test]
    fn prefix_without_uuid_is_canonical() {
        let id = ItemId::from("tmp-not-a-uuid");
        assert_eq!(id, ItemId::Canonical("tmp-not-a-uuid".into()));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ItemId::from("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        let back: ItemId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, id);
    }
}
