// ── Ordered reactive item collection ──
//
// Insertion-ordered storage with push-based change notification via a
// `watch` channel. All writes go through a closure that runs under one
// write lock, so a multi-step transition (e.g. swapping a provisional id
// for its canonical one) publishes a single snapshot.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use tokio::sync::watch;

use crate::model::{ItemId, WorkItem};

/// Point-in-time view of every item, in collection order.
pub type Snapshot = Arc<Vec<Arc<WorkItem>>>;

pub(crate) struct ItemCollection {
    state: RwLock<CollectionState>,

    /// Full snapshot, rebuilt on every effective write.
    snapshot: watch::Sender<Snapshot>,
}

struct CollectionState {
    items: IndexMap<ItemId, Arc<WorkItem>>,
    /// Bumped on every reset; settlements from an older epoch are dropped.
    epoch: u64,
    /// Next logical creation tick. Never moves backwards.
    next_tick: u64,
}

impl CollectionState {
    fn load(&mut self, items: Vec<WorkItem>) {
        let floor = items
            .iter()
            .map(|i| i.created_at.saturating_add(1))
            .max()
            .unwrap_or(0);
        self.next_tick = self.next_tick.max(floor);
        self.items = items
            .into_iter()
            .map(|item| (item.id.clone(), Arc::new(item)))
            .collect();
    }

    fn to_snapshot(&self) -> Snapshot {
        Arc::new(self.items.values().map(Arc::clone).collect())
    }
}

impl ItemCollection {
    /// Build a collection from already-validated items.
    pub(crate) fn new(items: Vec<WorkItem>) -> Self {
        let mut state = CollectionState {
            items: IndexMap::new(),
            epoch: 0,
            next_tick: 0,
        };
        state.load(items);
        let (snapshot, _) = watch::channel(state.to_snapshot());

        Self {
            state: RwLock::new(state),
            snapshot,
        }
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    pub(crate) fn get(&self, id: &ItemId) -> Option<Arc<WorkItem>> {
        self.read().items.get(id).map(Arc::clone)
    }

    pub(crate) fn len(&self) -> usize {
        self.read().items.len()
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.read().epoch
    }

    /// Run `f` against the entries under the write lock, publishing a new
    /// snapshot if it changed anything.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut Entries<'_>) -> R) -> R {
        let mut state = self.write_lock();
        let (result, dirty) = {
            let mut entries = Entries {
                state: &mut *state,
                dirty: false,
            };
            let result = f(&mut entries);
            (result, entries.dirty)
        };
        if dirty {
            self.publish(&state);
        }
        result
    }

    /// Like [`write`](Self::write), but only if the collection has not been
    /// reset since `epoch`. Returns `None` when the epoch has moved on.
    pub(crate) fn write_in<R>(
        &self,
        epoch: u64,
        f: impl FnOnce(&mut Entries<'_>) -> R,
    ) -> Option<R> {
        self.write(|entries| (entries.epoch() == epoch).then(|| f(entries)))
    }

    /// Replace every item and start a new epoch. Returns the new epoch.
    pub(crate) fn reset(&self, items: Vec<WorkItem>) -> u64 {
        let mut state = self.write_lock();
        state.load(items);
        state.epoch += 1;
        self.publish(&state);
        state.epoch
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn publish(&self, state: &CollectionState) {
        let values = state.to_snapshot();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = values);
    }

    fn read(&self) -> RwLockReadGuard<'_, CollectionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, CollectionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Mutable view handed to [`ItemCollection::write`] closures.
pub(crate) struct Entries<'a> {
    state: &'a mut CollectionState,
    dirty: bool,
}

impl Entries<'_> {
    pub(crate) fn epoch(&self) -> u64 {
        self.state.epoch
    }

    pub(crate) fn get(&self, id: &ItemId) -> Option<&WorkItem> {
        self.state.items.get(id).map(|item| &**item)
    }

    /// Take the next creation tick.
    pub(crate) fn next_tick(&mut self) -> u64 {
        let tick = self.state.next_tick;
        self.state.next_tick = tick.saturating_add(1);
        tick
    }

    /// Append an item. Returns `false` (and changes nothing) if the id is taken.
    pub(crate) fn push(&mut self, item: WorkItem) -> bool {
        if self.state.items.contains_key(&item.id) {
            return false;
        }
        self.state.items.insert(item.id.clone(), Arc::new(item));
        self.dirty = true;
        true
    }

    /// Edit an item in place. `f` returns `None` to signal "no change".
    pub(crate) fn modify<R>(
        &mut self,
        id: &ItemId,
        f: impl FnOnce(&mut WorkItem) -> Option<R>,
    ) -> Option<R> {
        let slot = self.state.items.get_mut(id)?;
        let mut item = (**slot).clone();
        let result = f(&mut item)?;
        *slot = Arc::new(item);
        self.dirty = true;
        Some(result)
    }

    pub(crate) fn remove(&mut self, id: &ItemId) -> Option<WorkItem> {
        let removed = self.state.items.shift_remove(id)?;
        self.dirty = true;
        Some(Arc::unwrap_or_clone(removed))
    }

    /// Swap the entry at `old` for `item` at the same position, re-keying it
    /// if the id changed. Returns `false` if `old` is gone or the new id
    /// already belongs to another entry.
    pub(crate) fn replace(&mut self, old: &ItemId, item: WorkItem) -> bool {
        let Some(index) = self.state.items.get_index_of(old) else {
            return false;
        };
        if item.id != *old && self.state.items.contains_key(&item.id) {
            return false;
        }
        self.state.items.shift_remove_index(index);
        self.state
            .items
            .shift_insert(index, item.id.clone(), Arc::new(item));
        self.dirty = true;
        true
    }

    /// Put a previously removed item back and restore chronological order
    /// across the whole collection.
    pub(crate) fn restore(&mut self, item: WorkItem) {
        self.state.items.insert(item.id.clone(), Arc::new(item));
        self.state
            .items
            .sort_by(|_, a, _, b| a.created_at.cmp(&b.created_at));
        self.dirty = true;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Stage;

    fn item(id: &str, created_at: u64) -> WorkItem {
        WorkItem::new(id, format!("item {id}"), Stage::Todo, created_at)
    }

    fn ids(col: &ItemCollection) -> Vec<String> {
        col.snapshot().iter().map(|i| i.id.to_string()).collect()
    }

    #[test]
    fn new_collection_keeps_insertion_order() {
        let col = ItemCollection::new(vec![item("b", 1), item("a", 0)]);
        assert_eq!(ids(&col), ["b", "a"]);
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn ticks_start_after_highest_created_at() {
        let col = ItemCollection::new(vec![item("a", 10), item("b", 30)]);
        let tick = col.write(|e| e.next_tick());
        assert_eq!(tick, 31);
    }

    #[test]
    fn push_rejects_duplicate_ids() {
        let col = ItemCollection::new(vec![item("a", 0)]);
        assert!(!col.write(|e| e.push(item("a", 5))));
        assert_eq!(col.get(&"a".into()).unwrap().created_at, 0);
    }

    #[test]
    fn replace_keeps_position_and_rekeys() {
        let col = ItemCollection::new(vec![item("a", 0), item("b", 1), item("c", 2)]);
        let replaced = col.write(|e| e.replace(&"b".into(), item("z", 1)));
        assert!(replaced);
        assert_eq!(ids(&col), ["a", "z", "c"]);
        assert!(col.get(&"b".into()).is_none());
    }

    #[test]
    fn replace_refuses_to_duplicate_an_id() {
        let col = ItemCollection::new(vec![item("a", 0), item("b", 1)]);
        assert!(!col.write(|e| e.replace(&"b".into(), item("a", 1))));
        assert_eq!(ids(&col), ["a", "b"]);
    }

    #[test]
    fn restore_reorders_by_created_at() {
        let col = ItemCollection::new(vec![item("x", 10), item("y", 20), item("z", 30)]);
        let removed = col.write(|e| e.remove(&"y".into())).unwrap();
        assert_eq!(ids(&col), ["x", "z"]);

        col.write(|e| e.restore(removed));
        assert_eq!(ids(&col), ["x", "y", "z"]);
    }

    #[test]
    fn modify_returning_none_publishes_nothing() {
        let col = ItemCollection::new(vec![item("a", 0)]);
        let mut rx = col.subscribe();
        rx.borrow_and_update();

        let changed = col.write(|e| e.modify(&"a".into(), |_| None::<()>));
        assert!(changed.is_none());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn write_in_skips_stale_epoch() {
        let col = ItemCollection::new(vec![item("a", 0)]);
        let epoch = col.epoch();
        col.reset(vec![item("b", 0)]);

        let applied = col.write_in(epoch, |e| e.remove(&"b".into()));
        assert!(applied.is_none());
        assert_eq!(ids(&col), ["b"]);
        assert_eq!(col.epoch(), epoch + 1);
    }

    #[test]
    fn reset_never_moves_ticks_backwards() {
        let col = ItemCollection::new(vec![item("a", 0)]);
        col.write(|e| {
            let tick = e.next_tick();
            e.push(item("n", tick))
        });
        col.reset(vec![item("a", 0)]);
        assert_eq!(col.write(|e| e.next_tick()), 2);
    }
}
