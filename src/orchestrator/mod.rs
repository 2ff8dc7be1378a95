//! Arena - the operations the transport boundary calls
//!
//! Maps client requests (raw id strings, move indices, optional model names)
//! onto the session registry and translates everything into [`ArenaError`].
//!
//! - `start_session` spawns an engine/AI pair for the selected model
//! - `make_move` plays one turn on its own task
//! - `reset` tears a session down (if any) and starts a fresh one
//! - `terminate` tears a session down
//! - `subscribe` joins a session's AI log channel

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::ArenaConfig;
use crate::error::Result;
use crate::models::{ModelCatalog, ModelListing};
use crate::session::{MoveOutcome, SessionId, SessionInfo, SessionRegistry};
use crate::spawner::LogEvent;

/// Orchestration entry point; one instance per running service
pub struct Arena {
    registry: SessionRegistry,
    models: ModelCatalog,
}

impl Arena {
    pub fn new(registry: SessionRegistry, models: ModelCatalog) -> Self {
        Self { registry, models }
    }

    pub fn from_config(config: &ArenaConfig) -> Self {
        let registry =
            SessionRegistry::with_retired_capacity(config.session_settings(), config.retired_capacity);
        let models = ModelCatalog::new(&config.models_dir, config.current_model.clone());
        Self::new(registry, models)
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn models(&self) -> &ModelCatalog {
        &self.models
    }

    /// Start a session against `model`, or the current selection
    pub async fn start_session(&self, model: Option<&str>) -> Result<SessionId> {
        let (name, program) = self.models.resolve_or_current(model).await?;
        self.registry.create_session(&name, &program).await
    }

    /// Play one turn; `index` may be [`crate::protocol::AI_MOVES_FIRST`].
    ///
    /// The exchange runs on its own task so a dropped request cannot stop it
    /// between a write and the matching read.
    pub async fn make_move(&self, session_id: &str, index: i32) -> Result<MoveOutcome> {
        let id: SessionId = session_id.parse()?;
        let session = self.registry.get(&id).await?;

        let outcome = tokio::spawn(async move { session.apply_move(index).await }).await??;
        debug!(session_id = %id, index, ai_move = outcome.index, win = outcome.win, "Move applied");
        Ok(outcome)
    }

    /// Close `session_id` if it exists, then start a new session.
    ///
    /// Always yields a fresh id, even for ids that were never issued. The
    /// model is resolved first; an unknown model leaves the old session alive.
    pub async fn reset(&self, session_id: &str, model: Option<&str>) -> Result<SessionId> {
        let (name, program) = self.models.resolve_or_current(model).await?;
        if let Ok(id) = session_id.parse::<SessionId>() {
            self.registry.remove_and_close(&id).await;
        }
        let new_id = self.registry.create_session(&name, &program).await?;
        info!(old_session = session_id, new_session = %new_id, "Session reset");
        Ok(new_id)
    }

    /// Tear a session down; unknown ids are a no-op
    pub async fn terminate(&self, session_id: &str) -> Result<SessionId> {
        let id: SessionId = session_id.parse()?;
        self.registry.remove_and_close(&id).await;
        Ok(id)
    }

    /// Join a session's AI log channel
    pub async fn subscribe(&self, session_id: &str) -> Result<(SessionId, broadcast::Receiver<LogEvent>)> {
        let id: SessionId = session_id.parse()?;
        let session = self.registry.get(&id).await?;
        Ok((id, session.subscribe()))
    }

    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        self.registry.list().await
    }

    pub async fn list_models(&self) -> Result<ModelListing> {
        self.models.listing().await
    }

    pub async fn select_model(&self, name: &str) -> Result<()> {
        self.models.select(name).await
    }

    /// Close every session; call once at shutdown
    pub async fn shutdown(&self) {
        self.registry.close_all().await;
    }
}
