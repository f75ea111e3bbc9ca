//! In-memory funnel sessions.
//!
//! One [`FunnelState`] per visitor, keyed by a server-issued session id.
//! The state machine owns all mutation; this store only hands out access
//! under the lock.  Durable resume state lives in the database, not here —
//! a restart loses open sessions but never an in-flight payment record.
//!
//! Session creation is unauthenticated, so the map cannot be allowed to
//! grow without bound: every access refreshes a last-touched stamp and the
//! background sweeper evicts sessions idle past the TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use funnel_core::FunnelState;

use crate::errors::{Result, ServerError};

struct SessionEntry {
    state: FunnelState,
    touched_at: Instant,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh session and return its id.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.write().await.insert(
            id,
            SessionEntry {
                state: FunnelState::new(),
                touched_at: Instant::now(),
            },
        );
        id
    }

    /// Snapshot a session's state.
    pub async fn get(&self, id: Uuid) -> Result<FunnelState> {
        let mut guard = self.inner.write().await;
        let entry = guard.get_mut(&id).ok_or(ServerError::SessionNotFound)?;
        entry.touched_at = Instant::now();
        Ok(entry.state.clone())
    }

    /// Run `f` against the session's state under the write lock and return
    /// its result alongside a snapshot of the updated state.
    pub async fn with_state<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut FunnelState) -> T,
    ) -> Result<(T, FunnelState)> {
        let mut guard = self.inner.write().await;
        let entry = guard.get_mut(&id).ok_or(ServerError::SessionNotFound)?;
        entry.touched_at = Instant::now();
        let out = f(&mut entry.state);
        Ok((out, entry.state.clone()))
    }

    /// Evict every session idle for longer than `max_idle`.  Returns how
    /// many were dropped.
    pub async fn purge_idle(&self, max_idle: Duration) -> usize {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, entry| entry.touched_at.elapsed() < max_idle);
        before - guard.len()
    }
}
