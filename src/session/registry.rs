// src/session/registry.rs
// Process-wide table of live sessions

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{Session, SessionId, SessionInfo, SessionSettings};
use crate::error::{ArenaError, Result};
use crate::spawner::ProgramSpec;

/// Default number of torn-down ids remembered for `SessionClosed` reporting
pub const DEFAULT_RETIRED_CAPACITY: usize = 4096;

#[derive(Default)]
struct Table {
    live: HashMap<SessionId, Arc<Session>>,
    retired: HashSet<SessionId>,
    retired_order: VecDeque<SessionId>,
}

impl Table {
    fn retire(&mut self, id: SessionId, capacity: usize) {
        if capacity == 0 || !self.retired.insert(id) {
            return;
        }
        self.retired_order.push_back(id);
        while self.retired_order.len() > capacity {
            if let Some(oldest) = self.retired_order.pop_front() {
                self.retired.remove(&oldest);
            }
        }
    }
}

/// Sole long-term owner of every session.
///
/// The lock guards only map operations; it is never held across a child
/// round trip or a close.
pub struct SessionRegistry {
    table: RwLock<Table>,
    settings: SessionSettings,
    retired_capacity: usize,
}

impl SessionRegistry {
    pub fn new(settings: SessionSettings) -> Self {
        Self::with_retired_capacity(settings, DEFAULT_RETIRED_CAPACITY)
    }

    pub fn with_retired_capacity(settings: SessionSettings, retired_capacity: usize) -> Self {
        Self {
            table: RwLock::new(Table::default()),
            settings,
            retired_capacity,
        }
    }

    /// Spawn a new session for `model` and register it under a fresh id
    pub async fn create_session(&self, model: &str, ai_program: &ProgramSpec) -> Result<SessionId> {
        let id = SessionId::new();
        let session = Session::create(id, &self.settings, model, ai_program)?;
        self.table.write().await.live.insert(id, Arc::new(session));
        Ok(id)
    }

    /// Look up a live session
    pub async fn get(&self, id: &SessionId) -> Result<Arc<Session>> {
        let table = self.table.read().await;
        if let Some(session) = table.live.get(id) {
            return Ok(session.clone());
        }
        if table.retired.contains(id) {
            Err(ArenaError::SessionClosed(id.to_string()))
        } else {
            Err(ArenaError::NoSuchSession(id.to_string()))
        }
    }

    /// Remove and close the session if present; no-op otherwise
    pub async fn remove_and_close(&self, id: &SessionId) {
        let removed = {
            let mut table = self.table.write().await;
            let removed = table.live.remove(id);
            if removed.is_some() {
                table.retire(*id, self.retired_capacity);
            }
            removed
        };

        match removed {
            Some(session) => session.close().await,
            None => debug!(session_id = %id, "Nothing to close"),
        }
    }

    /// Close every session; used at shutdown
    pub async fn close_all(&self) {
        let drained: Vec<Arc<Session>> = {
            let mut table = self.table.write().await;
            let drained: Vec<_> = table.live.drain().map(|(_, s)| s).collect();
            for session in &drained {
                table.retire(session.id(), self.retired_capacity);
            }
            drained
        };

        if !drained.is_empty() {
            info!(count = drained.len(), "Closing all sessions");
        }
        for session in drained {
            session.close().await;
        }
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.live.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn list(&self) -> Vec<SessionInfo> {
        let table = self.table.read().await;
        let mut infos: Vec<SessionInfo> = table.live.values().map(|s| s.info()).collect();
        infos.sort_by_key(|info| info.created_at);
        infos
    }
}
