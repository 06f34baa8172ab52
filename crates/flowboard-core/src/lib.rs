//! Optimistic-update work-item board on top of `flowboard-api`.
//!
//! - **[`Board`]**: Facade owning the item collection, the session and an
//!   optional [`Persistence`] sink. Mutations require an active session;
//!   [`logout()`](Board::logout) resets the collection to the seed.
//!
//! - **[`ItemStore`]**: The optimistic engine. Each mutation is applied
//!   locally at once, sent to the [`RemoteSimulator`](flowboard_api::RemoteSimulator),
//!   then confirmed or rolled back. Exactly one [`Notification`] is emitted
//!   per settled mutation.
//!
//! - **[`ItemStream`]**: `watch`-backed subscription to collection
//!   snapshots, exposing `current()` / `latest()` / `changed()`.
//!
//! - **Domain model** ([`model`]): [`WorkItem`], [`Stage`], [`ItemId`]
//!   (provisional or canonical) and [`Session`].

pub mod board;
pub mod command;
pub mod config;
mod convert;
pub mod error;
pub mod model;
pub mod notification;
pub mod persist;
mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use board::{Board, BoardBuilder, BoardSnapshot};
pub use command::{Mutation, Settlement};
pub use config::BoardConfig;
pub use error::CoreError;
pub use model::{ItemId, Session, Stage, WorkItem, default_seed};
pub use notification::{MutationKind, Notification, NotificationKind};
pub use persist::{PersistedState, Persistence};
pub use store::{ItemStore, Snapshot};
pub use stream::{ItemStream, ItemWatchStream};
