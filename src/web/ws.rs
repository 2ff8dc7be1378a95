// src/web/ws.rs
// WebSocket log subscriptions: clients join sessions and receive their AI logs

use std::collections::HashMap;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::state::AppState;
use crate::session::SessionId;
use crate::spawner::LogEvent;

/// Messages a client may send
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinGame {
        #[serde(alias = "game_id")]
        session_id: String,
    },
    LeaveGame {
        #[serde(alias = "game_id")]
        session_id: String,
    },
}

/// Messages pushed to the client
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerMessage {
    Joined { session_id: SessionId },
    BotLog { session_id: SessionId, log: String },
    Error { error: String, message: String },
}

impl From<LogEvent> for ServerMessage {
    fn from(event: LogEvent) -> Self {
        Self::BotLog {
            session_id: event.session_id,
            log: event.log,
        }
    }
}

pub async fn handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(64);

    let writer = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let Ok(text) = serde_json::to_string(&msg) else {
                continue;
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // One forwarder per joined session
    let mut joined: HashMap<SessionId, JoinHandle<()>> = HashMap::new();

    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        match serde_json::from_str::<ClientMessage>(text.as_str()) {
            Ok(ClientMessage::JoinGame { session_id }) => {
                match state.arena.subscribe(&session_id).await {
                    Ok((id, rx)) => {
                        if let Some(previous) = joined.insert(id, spawn_forwarder(id, rx, out_tx.clone())) {
                            previous.abort();
                        }
                        debug!(session_id = %id, "Client joined session logs");
                        let _ = out_tx.send(ServerMessage::Joined { session_id: id }).await;
                    }
                    Err(e) => {
                        let _ = out_tx
                            .send(ServerMessage::Error {
                                error: e.kind().to_string(),
                                message: e.to_string(),
                            })
                            .await;
                    }
                }
            }
            Ok(ClientMessage::LeaveGame { session_id }) => {
                if let Ok(id) = session_id.parse::<SessionId>() {
                    if let Some(forwarder) = joined.remove(&id) {
                        forwarder.abort();
                    }
                }
            }
            Err(e) => {
                let _ = out_tx
                    .send(ServerMessage::Error {
                        error: "bad_request".to_string(),
                        message: e.to_string(),
                    })
                    .await;
            }
        }
    }

    for (_, forwarder) in joined {
        forwarder.abort();
    }
    drop(out_tx);
    let _ = writer.await;
    info!("WebSocket client disconnected");
}

/// Push one session's log events into the connection's outbound queue
fn spawn_forwarder(
    session_id: SessionId,
    mut rx: broadcast::Receiver<LogEvent>,
    out_tx: mpsc::Sender<ServerMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if out_tx.send(event.into()).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!(session_id = %session_id, skipped = n, "WebSocket log forwarder lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join_with_legacy_key() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"join_game","game_id":"abc"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::JoinGame { session_id } if session_id == "abc"));
    }

    #[test]
    fn test_bot_log_shape() {
        let id = SessionId::new();
        let msg = ServerMessage::from(LogEvent {
            session_id: id,
            log: "depth 4".to_string(),
        });
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["event"], "bot_log");
        assert_eq!(value["log"], "depth 4");
        assert_eq!(value["session_id"], id.to_string());
    }
}
