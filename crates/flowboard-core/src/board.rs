// ── Board facade ──
//
// Owns the item store, the session, and the optional persistence sink.
// Every mutation requires an active session; logout resets the items to
// the configured seed.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use flowboard_api::RemoteSimulator;

use crate::command::{Mutation, Settlement};
use crate::config::BoardConfig;
use crate::error::CoreError;
use crate::model::item::check_collection;
use crate::model::{ItemId, Session, Stage, WorkItem};
use crate::notification::Notification;
use crate::persist::{PersistedState, Persistence};
use crate::session::SessionState;
use crate::store::ItemStore;
use crate::stream::ItemStream;

// ── BoardSnapshot ────────────────────────────────────────────────

/// Point-in-time view of the whole board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub items: Vec<WorkItem>,
    pub session: Option<Session>,
}

impl BoardSnapshot {
    /// Items in `stage`, in collection order.
    pub fn stage(&self, stage: Stage) -> impl Iterator<Item = &WorkItem> {
        self.items.iter().filter(move |item| item.stage == stage)
    }
}

// ── Board ────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<BoardInner>`; clones share one collection,
/// session and notification channel.
#[derive(Clone)]
pub struct Board {
    inner: Arc<BoardInner>,
}

struct BoardInner {
    config: BoardConfig,
    store: ItemStore,
    session: SessionState,
    persistence: Option<Box<dyn Persistence>>,
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("items", &self.inner.store.len())
            .field("session", &self.inner.session.current())
            .finish_non_exhaustive()
    }
}

impl Board {
    /// A logged-out board seeded from `config`.
    pub fn new(config: BoardConfig, remote: RemoteSimulator) -> Result<Self, CoreError> {
        Self::builder(config, remote).build()
    }

    /// Rehydrate a board from a previously persisted state.
    pub fn restore(
        config: BoardConfig,
        remote: RemoteSimulator,
        state: PersistedState,
    ) -> Result<Self, CoreError> {
        Self::builder(config, remote).restore(state).build()
    }

    pub fn builder(config: BoardConfig, remote: RemoteSimulator) -> BoardBuilder {
        BoardBuilder {
            config,
            remote,
            state: None,
            persistence: None,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.inner.config
    }

    pub fn remote(&self) -> &RemoteSimulator {
        self.inner.store.remote()
    }

    // ── Session ──────────────────────────────────────────────────

    /// Start a session. Re-login replaces the identity; items are untouched.
    pub fn login(&self, identity: &str) -> Result<Session, CoreError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(CoreError::Validation {
                field: "identity".into(),
                reason: "identity must not be empty".into(),
            });
        }
        let session = self.inner.session.login(identity.to_owned());
        info!(identity = %session.identity, "logged in");
        self.persist();
        Ok(session)
    }

    /// End the session and reset the items to the seed. In-flight
    /// mutations settle as [`Settlement::Discarded`].
    pub fn logout(&self) {
        let ended = self.inner.session.logout();
        self.inner.store.reset(self.inner.config.seed.clone());
        match ended {
            Some(session) => info!(identity = %session.identity, "logged out"),
            None => debug!("logout without an active session"),
        }
        self.persist();
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.session.current()
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.session.is_active()
    }

    pub fn session_changes(&self) -> watch::Receiver<Option<Session>> {
        self.inner.session.subscribe()
    }

    // ── Mutations ────────────────────────────────────────────────

    pub async fn create(&self, title: &str) -> Result<Settlement, CoreError> {
        self.require_session()?;
        let result = self.inner.store.create(title).await;
        self.after(result)
    }

    pub async fn move_item(&self, id: &ItemId, stage: Stage) -> Result<Settlement, CoreError> {
        self.require_session()?;
        let result = self.inner.store.move_item(id, stage).await;
        self.after(result)
    }

    pub async fn remove(&self, id: &ItemId) -> Result<Settlement, CoreError> {
        self.require_session()?;
        let result = self.inner.store.remove(id).await;
        self.after(result)
    }

    pub async fn rename(&self, id: &ItemId, title: &str) -> Result<Settlement, CoreError> {
        self.require_session()?;
        let result = self.inner.store.rename(id, title).await;
        self.after(result)
    }

    /// Route a [`Mutation`] to the matching typed method.
    pub async fn execute(&self, mutation: Mutation) -> Result<Settlement, CoreError> {
        match mutation {
            Mutation::Create { title } => self.create(&title).await,
            Mutation::Move { id, stage } => self.move_item(&id, stage).await,
            Mutation::Remove { id } => self.remove(&id).await,
            Mutation::Rename { id, title } => self.rename(&id, &title).await,
        }
    }

    // ── Reads ────────────────────────────────────────────────────

    pub fn list_by_stage(&self, stage: Stage) -> Vec<Arc<WorkItem>> {
        self.inner.store.list_by_stage(stage)
    }

    pub fn get(&self, id: &ItemId) -> Option<Arc<WorkItem>> {
        self.inner.store.get(id)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            items: self
                .inner
                .store
                .snapshot()
                .iter()
                .map(|item| (**item).clone())
                .collect(),
            session: self.session(),
        }
    }

    pub fn items(&self) -> ItemStream {
        self.inner.store.subscribe()
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.store.notifications()
    }

    /// The state a host should save right now.
    pub fn persisted_state(&self) -> PersistedState {
        PersistedState::capture(self.session(), &self.inner.store.snapshot())
    }

    // ── Private helpers ──────────────────────────────────────────

    fn require_session(&self) -> Result<(), CoreError> {
        if self.inner.session.is_active() {
            Ok(())
        } else {
            Err(CoreError::NotLoggedIn)
        }
    }

    /// Persist after anything that settled, including unexpected errors.
    fn after(&self, result: Result<Settlement, CoreError>) -> Result<Settlement, CoreError> {
        let settled = match &result {
            Ok(settlement) => settlement.is_settled(),
            Err(err) => matches!(err, CoreError::UnexpectedRemote { .. }),
        };
        if settled {
            self.persist();
        }
        result
    }

    fn persist(&self) {
        let Some(persistence) = &self.inner.persistence else {
            return;
        };
        if let Err(e) = persistence.save(&self.persisted_state()) {
            warn!(error = %e, "failed to persist board state");
        }
    }
}

// ── BoardBuilder ─────────────────────────────────────────────────

/// Assembles a [`Board`]; everything is validated in [`build`](Self::build).
pub struct BoardBuilder {
    config: BoardConfig,
    remote: RemoteSimulator,
    state: Option<PersistedState>,
    persistence: Option<Box<dyn Persistence>>,
}

impl BoardBuilder {
    /// Start from a persisted state instead of the seed.
    pub fn restore(mut self, state: PersistedState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn persistence(mut self, persistence: impl Persistence + 'static) -> Self {
        self.persistence = Some(Box::new(persistence));
        self
    }

    pub fn build(self) -> Result<Board, CoreError> {
        if self.config.notification_capacity == 0 {
            return Err(CoreError::Config {
                message: "notification capacity must be greater than zero".into(),
            });
        }
        check_collection(&self.config.seed)?;

        let (session, items) = match self.state {
            Some(state) => {
                state.validate()?;
                debug!(items = state.items.len(), "restoring persisted board");
                (state.session, state.items)
            }
            None => (None, self.config.seed.clone()),
        };

        let store = ItemStore::new(
            items,
            self.remote,
            self.config.serialize_per_item,
            self.config.notification_capacity,
        );

        Ok(Board {
            inner: Arc::new(BoardInner {
                config: self.config,
                store,
                session: SessionState::new(session),
                persistence: self.persistence,
            }),
        })
    }
}
