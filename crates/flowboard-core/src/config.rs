// ── Runtime board configuration ──
//
// Describes how the board behaves; never touches disk. The config crate
// (or a test) builds a `BoardConfig` and hands it in.

use crate::model::{WorkItem, default_seed};

const DEFAULT_NOTIFICATION_CAPACITY: usize = 64;

/// Configuration for a single [`Board`](crate::Board).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Allow at most one in-flight mutation per item id. Later mutations
    /// on the same id wait for the earlier one to settle before they take
    /// their snapshot.
    pub serialize_per_item: bool,
    /// Buffer size of the notification broadcast channel.
    pub notification_capacity: usize,
    /// Items the collection starts from and resets to on logout.
    pub seed: Vec<WorkItem>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            serialize_per_item: true,
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
            seed: default_seed(),
        }
    }
}
