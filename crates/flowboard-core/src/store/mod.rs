// ── Item storage ──
//
// `ItemCollection` holds the ordered items and publishes snapshots.
// `ItemStore` layers the optimistic mutation engine on top of it.

mod collection;
mod gate;
mod item_store;

pub use collection::Snapshot;
pub use item_store::ItemStore;
