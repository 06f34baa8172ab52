// ── Domain model ──
//
// Work items, their identifiers and stages, and the user session.
// Everything here is plain data; the store owns mutation.

pub mod item;
pub mod item_id;
pub mod session;

// ── Re-exports ──────────────────────────────────────────────────────

pub use item::{Stage, WorkItem, default_seed};
pub use item_id::ItemId;
pub use session::Session;
