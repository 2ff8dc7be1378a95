// src/session/mod.rs
// One game: an engine process and an AI process under a single id

mod id;
pub mod registry;

pub use id::SessionId;
pub use registry::SessionRegistry;

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{ArenaError, Result};
use crate::protocol::engine::{self, EngineReply};
use crate::protocol::{AI_MOVES_FIRST, Player, ai};
use crate::spawner::{ChildHandle, ChildRole, LogEvent, LogRelay, ProgramSpec};

/// Settings shared by every session a registry creates
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Rules engine executable
    pub engine: ProgramSpec,
    /// Bounded wait for one child round trip
    pub reply_timeout: Duration,
    /// Buffered log lines per session before slow subscribers lag
    pub log_capacity: usize,
}

/// Lifecycle state visible to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Closed,
}

/// Result of one successful turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub win: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Player>,
    /// Index of the last stone placed (the human's on a human win, else the AI's)
    #[serde(rename = "move")]
    pub index: i32,
}

impl MoveOutcome {
    fn placed(player: Player, index: i32, reply: EngineReply) -> Self {
        let win = reply == EngineReply::Win;
        Self {
            win,
            winner: win.then_some(player),
            index,
        }
    }
}

/// Snapshot for listings
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub model: String,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub moves: u32,
}

/// Child handles, only reachable while the session mutex is held
struct Players {
    engine: ChildHandle,
    ai: ChildHandle,
    relay: Option<JoinHandle<()>>,
}

/// A paired engine/AI lifecycle.
///
/// Both children are running while the session is Active and both have been
/// signalled once it is Closed. `apply_move` and `close` take the same
/// mutex, so a close never races a write in flight.
pub struct Session {
    id: SessionId,
    model: String,
    created_at: DateTime<Utc>,
    log_tx: broadcast::Sender<LogEvent>,
    players: Mutex<Players>,
    /// Written only while `players` is locked
    closed: AtomicBool,
    moves: AtomicU32,
}

impl Session {
    /// Spawn the engine and the AI, then start relaying the AI's stderr
    pub fn create(
        id: SessionId,
        settings: &SessionSettings,
        model: impl Into<String>,
        ai_program: &ProgramSpec,
    ) -> Result<Self> {
        let model = model.into();

        let mut engine = ChildHandle::start(ChildRole::Engine, &settings.engine, settings.reply_timeout)?;
        let mut ai = match ChildHandle::start(ChildRole::Ai, ai_program, settings.reply_timeout) {
            Ok(ai) => ai,
            Err(e) => {
                engine.terminate();
                return Err(e);
            }
        };

        let (log_tx, _) = broadcast::channel(settings.log_capacity.max(1));
        let relay = ai
            .take_diagnostics()
            .map(|stderr| LogRelay::new(id, log_tx.clone()).spawn(stderr));

        info!(session_id = %id, model = %model, "Session started");

        Ok(Self {
            id,
            model,
            created_at: Utc::now(),
            log_tx,
            players: Mutex::new(Players { engine, ai, relay }),
            closed: AtomicBool::new(false),
            moves: AtomicU32::new(0),
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn state(&self) -> SessionState {
        if self.closed.load(Ordering::Acquire) {
            SessionState::Closed
        } else {
            SessionState::Active
        }
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.id,
            model: self.model.clone(),
            state: self.state(),
            created_at: self.created_at,
            moves: self.moves.load(Ordering::Relaxed),
        }
    }

    /// Receive this session's AI diagnostics from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.log_tx.subscribe()
    }

    /// Play one turn.
    ///
    /// `index` is the human's stone, or [`AI_MOVES_FIRST`] to let the AI open.
    pub async fn apply_move(&self, index: i32) -> Result<MoveOutcome> {
        let mut players = self.players.lock().await;
        if self.closed.load(Ordering::Acquire) {
            return Err(ArenaError::SessionClosed(self.id.to_string()));
        }

        if index != AI_MOVES_FIRST {
            let reply = players
                .engine
                .request(&engine::encode_move(index, Player::One))
                .await?;
            match engine::decode_reply(&reply) {
                EngineReply::Invalid => return Err(ArenaError::InvalidMove(index)),
                EngineReply::Win => {
                    self.moves.fetch_add(1, Ordering::Relaxed);
                    info!(session_id = %self.id, index, "Human won");
                    return Ok(MoveOutcome::placed(Player::One, index, EngineReply::Win));
                }
                EngineReply::Continue => {}
            }
        }

        let reply = players.ai.request(&ai::encode_last_move(index)).await?;
        let ai_index = ai::decode_choice(&reply)?;

        let reply = players
            .engine
            .request(&engine::encode_move(ai_index, Player::Two))
            .await?;
        let status = engine::decode_reply(&reply);
        if status == EngineReply::Invalid {
            warn!(session_id = %self.id, ai_index, "Engine rejected the AI's move");
            return Err(ArenaError::protocol(format!(
                "engine rejected AI move {ai_index}"
            )));
        }

        self.moves.fetch_add(1, Ordering::Relaxed);
        if status == EngineReply::Win {
            info!(session_id = %self.id, ai_index, "AI won");
        }
        Ok(MoveOutcome::placed(Player::Two, ai_index, status))
    }

    /// Terminate both children and stop the relay.
    ///
    /// Waits for any move in flight to finish first. Idempotent.
    pub async fn close(&self) {
        let mut players = self.players.lock().await;
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        players.engine.terminate();
        players.ai.terminate();
        if let Some(relay) = players.relay.take() {
            relay.abort();
        }

        info!(session_id = %self.id, "Session closed");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(relay) = self.players.get_mut().relay.take() {
            relay.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let continued = MoveOutcome::placed(Player::Two, 190, EngineReply::Continue);
        assert_eq!(
            serde_json::to_value(continued).unwrap(),
            serde_json::json!({ "win": false, "move": 190 })
        );

        let won = MoveOutcome::placed(Player::One, 42, EngineReply::Win);
        assert_eq!(
            serde_json::to_value(won).unwrap(),
            serde_json::json!({ "win": true, "winner": "X", "move": 42 })
        );
    }

    #[test]
    fn test_state_serialization() {
        assert_eq!(serde_json::to_string(&SessionState::Active).unwrap(), r#""active""#);
    }
}
