// ── Optimistic mutation engine ──
//
// Every mutation follows the same shape:
//
//   gate (optional) -> snapshot + apply under one write -> remote await
//     -> confirm or roll back under one write -> one notification
//
// The epoch is read before waiting on the gate, so a mutation queued
// across a reset (logout) is discarded instead of touching the fresh
// collection, as are settlements whose remote call spans a reset.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use flowboard_api::RemoteSimulator;

use super::collection::{Entries, ItemCollection, Snapshot};
use super::gate::{GateGuard, ItemGates};
use crate::command::Settlement;
use crate::convert::{item_from_remote, to_new_item};
use crate::error::CoreError;
use crate::model::item::normalize_title;
use crate::model::{ItemId, Stage, WorkItem};
use crate::notification::{MutationKind, Notification};
use crate::stream::ItemStream;

/// Why the remote did not confirm a mutation.
enum Rejection {
    /// Injected failure: expected, recovered silently.
    Simulated(String),
    /// Backend fault: recovered, but surfaced as an error.
    Unexpected(String),
}

impl From<flowboard_api::Error> for Rejection {
    fn from(err: flowboard_api::Error) -> Self {
        match err {
            flowboard_api::Error::Simulated { reason, .. } => Self::Simulated(reason),
            other => Self::Unexpected(other.to_string()),
        }
    }
}

/// User-facing wording for one mutation's notifications.
struct Wording {
    success: String,
    failure: String,
}

/// The authoritative in-memory collection plus the optimistic engine.
pub struct ItemStore {
    items: ItemCollection,
    gates: Option<ItemGates>,
    /// Provisional id -> canonical id, for confirmed creates.
    aliases: DashMap<ItemId, ItemId>,
    remote: RemoteSimulator,
    notifications: broadcast::Sender<Notification>,
}

impl ItemStore {
    /// Build a store over `items`, which must already satisfy the
    /// collection invariants.
    pub(crate) fn new(
        items: Vec<WorkItem>,
        remote: RemoteSimulator,
        serialize_per_item: bool,
        notification_capacity: usize,
    ) -> Self {
        let (notifications, _) = broadcast::channel(notification_capacity.max(1));
        Self {
            items: ItemCollection::new(items),
            gates: serialize_per_item.then(ItemGates::new),
            aliases: DashMap::new(),
            remote,
            notifications,
        }
    }

    pub fn remote(&self) -> &RemoteSimulator {
        &self.remote
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Every item in insertion order, including optimistic changes.
    pub fn snapshot(&self) -> Snapshot {
        self.items.snapshot()
    }

    /// Items currently in `stage`, in insertion order.
    pub fn list_by_stage(&self, stage: Stage) -> Vec<Arc<WorkItem>> {
        self.items
            .snapshot()
            .iter()
            .filter(|item| item.stage == stage)
            .cloned()
            .collect()
    }

    /// Look up an item, following a confirmed provisional id.
    pub fn get(&self, id: &ItemId) -> Option<Arc<WorkItem>> {
        self.items.get(&self.resolve(id))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of resets so far.
    pub fn epoch(&self) -> u64 {
        self.items.epoch()
    }

    /// Subscribe to collection changes.
    pub fn subscribe(&self) -> ItemStream {
        ItemStream::new(self.items.subscribe())
    }

    /// Subscribe to outcome notifications.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Append a provisional item, then swap in the canonical one the remote
    /// returns, or drop it if the remote refuses.
    pub async fn create(&self, title: &str) -> Result<Settlement, CoreError> {
        let title = normalize_title(title)?;
        let provisional = ItemId::provisional();
        let epoch = self.items.epoch();
        let _gate = self.gate(&provisional).await;

        let Some(draft) = self.items.write_in(epoch, |entries| {
            let draft = WorkItem::new(
                provisional.clone(),
                title,
                Stage::first(),
                entries.next_tick(),
            );
            entries.push(draft.clone());
            draft
        }) else {
            return Ok(discarded(MutationKind::Create, &provisional));
        };
        debug!(id = %provisional, title = %draft.title, "create applied optimistically");

        let result = match self.remote.create(to_new_item(&draft)).await {
            Ok(remote) => item_from_remote(remote).map_err(Rejection::Unexpected),
            Err(e) => Err(e.into()),
        };
        let wording = Wording {
            success: format!("Created \"{}\"", draft.title),
            failure: format!("Could not create \"{}\"", draft.title),
        };

        self.settle(
            MutationKind::Create,
            &provisional,
            epoch,
            result,
            |entries, canonical| {
                // Keep the stage the item holds locally.
                let stage = entries
                    .get(&provisional)
                    .map_or(canonical.stage, |current| current.stage);
                let id = canonical.id.clone();
                if entries.replace(&provisional, WorkItem { stage, ..canonical }) {
                    self.aliases.insert(provisional.clone(), id.clone());
                } else {
                    warn!(id = %provisional, "provisional item vanished before confirmation");
                }
                id
            },
            |entries| {
                entries.remove(&provisional);
            },
            wording,
        )
    }

    /// Set an item's stage, restoring the previous stage if the remote refuses.
    /// Moving an item to the stage it already occupies is a no-op.
    pub async fn move_item(&self, id: &ItemId, target: Stage) -> Result<Settlement, CoreError> {
        let epoch = self.items.epoch();
        let (_gate, id) = self.enter(id).await;

        let Some(applied) = self.items.write_in(epoch, |entries| {
            entries.modify(&id, |item| {
                (item.stage != target).then(|| {
                    let previous = item.stage;
                    item.stage = target;
                    (previous, item.title.clone())
                })
            })
        }) else {
            return Ok(discarded(MutationKind::Move, &id));
        };
        let Some((previous, title)) = applied else {
            debug!(id = %id, %target, "move skipped: unknown id or same stage");
            return Ok(Settlement::Unchanged);
        };
        debug!(id = %id, from = %previous, to = %target, "move applied optimistically");

        let result = self
            .remote
            .relocate(&id.to_string(), previous.as_str(), target.as_str())
            .await
            .map_err(Rejection::from);
        let wording = Wording {
            success: format!("Moved \"{title}\" to {}", target.label()),
            failure: format!("Could not move \"{title}\" to {}", target.label()),
        };

        self.settle(
            MutationKind::Move,
            &id,
            epoch,
            result,
            |_, _| id.clone(),
            |entries| {
                entries.modify(&id, |item| {
                    item.stage = previous;
                    Some(())
                });
            },
            wording,
        )
    }

    /// Delete an item, reinstating it in chronological position if the
    /// remote refuses.
    pub async fn remove(&self, id: &ItemId) -> Result<Settlement, CoreError> {
        let epoch = self.items.epoch();
        let (_gate, id) = self.enter(id).await;

        let Some(applied) = self.items.write_in(epoch, |entries| entries.remove(&id)) else {
            return Ok(discarded(MutationKind::Remove, &id));
        };
        let Some(removed) = applied else {
            debug!(id = %id, "remove skipped: unknown id");
            return Ok(Settlement::Unchanged);
        };
        debug!(id = %id, "remove applied optimistically");

        let result = self
            .remote
            .remove(&id.to_string())
            .await
            .map_err(Rejection::from);
        let wording = Wording {
            success: format!("Deleted \"{}\"", removed.title),
            failure: format!("Could not delete \"{}\"", removed.title),
        };

        self.settle(
            MutationKind::Remove,
            &id,
            epoch,
            result,
            |_, _| {
                // Nothing can follow an alias to a deleted item.
                self.aliases.retain(|_, canonical| *canonical != id);
                id.clone()
            },
            |entries| entries.restore(removed),
            wording,
        )
    }

    /// Retitle an item, restoring the old title if the remote refuses.
    /// A title equal to the current one (after trimming) is a no-op.
    pub async fn rename(&self, id: &ItemId, title: &str) -> Result<Settlement, CoreError> {
        let title = normalize_title(title)?;
        let epoch = self.items.epoch();
        let (_gate, id) = self.enter(id).await;

        let Some(applied) = self.items.write_in(epoch, |entries| {
            entries.modify(&id, |item| {
                (item.title != title).then(|| std::mem::replace(&mut item.title, title.clone()))
            })
        }) else {
            return Ok(discarded(MutationKind::Rename, &id));
        };
        let Some(previous) = applied else {
            debug!(id = %id, "rename skipped: unknown id or same title");
            return Ok(Settlement::Unchanged);
        };
        debug!(id = %id, from = %previous, to = %title, "rename applied optimistically");

        let result = self
            .remote
            .rename(&id.to_string(), &title)
            .await
            .map_err(Rejection::from);
        let wording = Wording {
            success: format!("Renamed \"{previous}\" to \"{title}\""),
            failure: format!("Could not rename \"{previous}\""),
        };

        self.settle(
            MutationKind::Rename,
            &id,
            epoch,
            result,
            |_, _| id.clone(),
            |entries| {
                entries.modify(&id, |item| {
                    item.title = previous;
                    Some(())
                });
            },
            wording,
        )
    }

    /// Replace the whole collection, starting a new epoch. In-flight
    /// mutations from before the reset settle as `Discarded`.
    pub(crate) fn reset(&self, items: Vec<WorkItem>) {
        let epoch = self.items.reset(items);
        self.aliases.clear();
        debug!(epoch, "collection reset");
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Follow a confirmed provisional id to its canonical id.
    fn resolve(&self, id: &ItemId) -> ItemId {
        self.aliases
            .get(id)
            .map_or_else(|| id.clone(), |canonical| canonical.value().clone())
    }

    async fn gate(&self, id: &ItemId) -> Option<GateGuard<'_>> {
        match &self.gates {
            Some(gates) => Some(gates.acquire(id).await),
            None => None,
        }
    }

    /// Hold the gate for `requested` and return the id to operate on.
    ///
    /// A caller may still hold a provisional id whose create was confirmed
    /// while it waited; in that case the gate is moved to the canonical id.
    async fn enter(&self, requested: &ItemId) -> (Option<GateGuard<'_>>, ItemId) {
        let guard = self.gate(requested).await;
        let resolved = self.resolve(requested);
        if resolved == *requested {
            return (guard, resolved);
        }
        drop(guard);
        (self.gate(&resolved).await, resolved)
    }

    /// Apply the remote outcome and emit the single notification.
    #[allow(clippy::too_many_arguments)]
    fn settle<T>(
        &self,
        kind: MutationKind,
        id: &ItemId,
        epoch: u64,
        result: Result<T, Rejection>,
        confirm: impl FnOnce(&mut Entries<'_>, T) -> ItemId,
        rollback: impl FnOnce(&mut Entries<'_>),
        wording: Wording,
    ) -> Result<Settlement, CoreError> {
        match result {
            Ok(value) => {
                let Some(final_id) = self.items.write_in(epoch, |entries| confirm(entries, value))
                else {
                    return Ok(discarded(kind, id));
                };
                debug!(id = %final_id, operation = %kind, "mutation confirmed");
                self.notify(Notification::success(kind, final_id, wording.success));
                Ok(Settlement::Confirmed)
            }
            Err(rejection) => {
                if self.items.write_in(epoch, rollback).is_none() {
                    return Ok(discarded(kind, id));
                }
                match rejection {
                    Rejection::Simulated(reason) => {
                        warn!(id = %id, operation = %kind, %reason, "mutation rolled back");
                        self.notify(Notification::failure(
                            kind,
                            id.clone(),
                            format!("{}: {reason}", wording.failure),
                        ));
                        Ok(Settlement::RolledBack { reason })
                    }
                    Rejection::Unexpected(message) => {
                        error!(
                            id = %id,
                            operation = %kind,
                            error = %message,
                            "unexpected remote error; mutation rolled back"
                        );
                        self.notify(Notification::failure(
                            kind,
                            id.clone(),
                            format!("{}: unexpected error", wording.failure),
                        ));
                        Err(CoreError::UnexpectedRemote {
                            operation: kind,
                            message,
                        })
                    }
                }
            }
        }
    }

    fn notify(&self, notification: Notification) {
        // No receivers is fine: notifications are fire-and-forget.
        let _ = self.notifications.send(notification);
    }
}

fn discarded(kind: MutationKind, id: &ItemId) -> Settlement {
    debug!(id = %id, operation = %kind, "settlement discarded: collection was reset");
    Settlement::Discarded
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use flowboard_api::{AlwaysSucceed, SimulatorConfig};

    use super::*;

    fn store(items: Vec<WorkItem>, serialize: bool) -> ItemStore {
        let remote = RemoteSimulator::with_decider(
            SimulatorConfig {
                latency: Duration::from_millis(100),
                ..SimulatorConfig::default()
            },
            Arc::new(AlwaysSucceed),
        )
        .unwrap();
        ItemStore::new(items, remote, serialize, 16)
    }

    #[tokio::test(start_paused = true)]
    async fn confirmed_create_registers_alias() {
        let store = store(Vec::new(), true);
        store.create("Alias me").await.unwrap();

        let item = store.snapshot()[0].clone();
        assert_eq!(store.aliases.len(), 1);
        let (provisional, canonical) = {
            let entry = store.aliases.iter().next().unwrap();
            (entry.key().clone(), entry.value().clone())
        };
        assert!(provisional.is_provisional());
        assert_eq!(canonical, item.id);
        assert_eq!(store.get(&provisional).unwrap().id, item.id);
    }

    #[tokio::test(start_paused = true)]
    async fn gates_are_released_after_settlement() {
        let store = store(vec![WorkItem::new("a", "A", Stage::Todo, 0)], true);
        store.move_item(&"a".into(), Stage::Done).await.unwrap();
        assert_eq!(store.gates.as_ref().unwrap().active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn confirmed_remove_drops_alias() {
        let store = store(Vec::new(), true);
        store.create("Short lived").await.unwrap();
        let id = store.snapshot()[0].id.clone();
        assert_eq!(store.aliases.len(), 1);

        store.remove(&id).await.unwrap();
        assert!(store.aliases.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_remove_keeps_alias() {
        let remote = RemoteSimulator::with_decider(
            SimulatorConfig {
                latency: Duration::from_millis(100),
                ..SimulatorConfig::default()
            },
            Arc::new(
                flowboard_api::Scripted::new()
                    .then(flowboard_api::Verdict::Succeed)
                    .then(flowboard_api::Verdict::Fail),
            ),
        )
        .unwrap();
        let store = ItemStore::new(Vec::new(), remote, true, 16);
        store.create("Sticky").await.unwrap();
        let id = store.snapshot()[0].id.clone();

        assert!(store.remove(&id).await.unwrap().is_rolled_back());
        assert_eq!(store.aliases.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_aliases() {
        let store = store(Vec::new(), false);
        store.create("Gone soon").await.unwrap();
        store.reset(Vec::new());
        assert_eq!(store.epoch(), 1);
        assert!(store.aliases.is_empty());
        assert!(store.is_empty());
    }
}
