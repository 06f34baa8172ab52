// ── Per-item mutation gates ──
//
// One async mutex per item id with an in-flight mutation. Holding the
// guard across the remote await guarantees a later mutation on the same
// id takes its snapshot only after the earlier one has settled. Entries
// are dropped as soon as nobody holds or waits on them.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::model::ItemId;

#[derive(Default)]
pub(crate) struct ItemGates {
    gates: DashMap<ItemId, Arc<Mutex<()>>>,
}

impl ItemGates {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait until no other mutation holds `id`, then hold it.
    pub(crate) async fn acquire(&self, id: &ItemId) -> GateGuard<'_> {
        // The shard lock is released before awaiting.
        let gate = Arc::clone(&self.gates.entry(id.clone()).or_default());
        let guard = gate.lock_owned().await;
        GateGuard {
            gates: self,
            id: id.clone(),
            guard: Some(guard),
        }
    }

    /// Number of ids currently held or waited on.
    #[cfg(test)]
    pub(crate) fn active(&self) -> usize {
        self.gates.len()
    }
}

pub(crate) struct GateGuard<'a> {
    gates: &'a ItemGates,
    id: ItemId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own reference left: nobody is waiting.
        self.gates
            .gates
            .remove_if(&self.id, |_, gate| Arc::strong_count(gate) == 1);
    }
}
